//! 查询转换
//! 把请求参数转换为存储层的过滤、排序、投影描述

use crate::{
    auth::Claims,
    error::AppError,
    models::UpdateBookingStatusRequest,
    store::{Document, DocumentId, Filter, FindQuery, Projection, Sort, SortDirection},
};
use serde::Deserialize;
use serde_json::Value;

/// 服务详情返回的字段（`_id` 总是返回）
///
/// `imdb` 沿用历史数据中的字段名。
pub const SERVICE_DETAIL_FIELDS: [&str; 5] = ["title", "imdb", "price", "service_id", "img"];

/// `GET /services` 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct ServiceListParams {
    /// "asc" 按价格升序，其他值或缺省按价格降序
    pub sort: Option<String>,
    /// 标题子串，忽略大小写
    pub search: Option<String>,
}

/// `GET /bookings` 查询参数
#[derive(Debug, Default, Deserialize)]
pub struct BookingListParams {
    pub email: Option<String>,
}

/// 服务详情查询
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDetailQuery {
    pub id: DocumentId,
    pub projection: Projection,
}

pub fn service_list_query(params: &ServiceListParams) -> FindQuery {
    let filter = match params.search.as_deref() {
        Some(search) if !search.is_empty() => Filter::ContainsIgnoreCase {
            field: "title".to_string(),
            needle: search.to_string(),
        },
        _ => Filter::All,
    };

    let direction = match params.sort.as_deref() {
        Some("asc") => SortDirection::Ascending,
        _ => SortDirection::Descending,
    };

    FindQuery {
        filter,
        sort: Some(Sort {
            field: "price".to_string(),
            direction,
        }),
    }
}

pub fn service_detail_query(id: &str) -> Result<ServiceDetailQuery, AppError> {
    Ok(ServiceDetailQuery {
        id: id.parse()?,
        projection: Projection::new(SERVICE_DETAIL_FIELDS),
    })
}

/// 校验调用者能否按 `requested` 邮箱列出预约
///
/// 按严格不等比较：令牌 email 声明与查询参数都缺省时放行，
/// 此时列表不做过滤。
pub fn authorize_booking_listing(
    claims: &Claims,
    requested: Option<&str>,
) -> Result<(), AppError> {
    let allowed = match (claims.email(), requested) {
        (None, None) => true,
        (Some(Value::String(claimed)), Some(requested)) => claimed == requested,
        _ => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn booking_list_query(params: &BookingListParams) -> FindQuery {
    let filter = match params.email.as_deref() {
        Some(email) if !email.is_empty() => Filter::Eq {
            field: "email".to_string(),
            value: email.to_string(),
        },
        _ => Filter::All,
    };

    FindQuery { filter, sort: None }
}

/// `$set` 文档：只包含 status
pub fn booking_status_update(req: UpdateBookingStatusRequest) -> Document {
    let mut set = Document::new();
    set.insert("status".to_string(), Value::String(req.status));
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn claims(custom: Value) -> Claims {
        Claims {
            custom: custom.as_object().cloned().unwrap_or_else(Map::new),
            iat: 0,
            exp: 0,
        }
    }

    #[test]
    fn test_service_list_defaults_to_descending_all() {
        let query = service_list_query(&ServiceListParams::default());

        assert_eq!(query.filter, Filter::All);
        assert_eq!(query.sort.unwrap().direction, SortDirection::Descending);
    }

    #[test]
    fn test_service_list_asc_with_search() {
        let query = service_list_query(&ServiceListParams {
            sort: Some("asc".to_string()),
            search: Some("Oil".to_string()),
        });

        assert_eq!(
            query.filter,
            Filter::ContainsIgnoreCase {
                field: "title".to_string(),
                needle: "Oil".to_string()
            }
        );
        let sort = query.sort.unwrap();
        assert_eq!(sort.field, "price");
        assert_eq!(sort.direction, SortDirection::Ascending);
    }

    #[test]
    fn test_service_list_unknown_sort_is_descending() {
        let query = service_list_query(&ServiceListParams {
            sort: Some("ASC".to_string()),
            search: Some(String::new()),
        });

        assert_eq!(query.filter, Filter::All);
        assert_eq!(query.sort.unwrap().direction, SortDirection::Descending);
    }

    #[test]
    fn test_service_detail_query() {
        let id = DocumentId::new();
        let query = service_detail_query(&id.to_string()).unwrap();

        assert_eq!(query.id, id);
        assert_eq!(query.projection.fields(), SERVICE_DETAIL_FIELDS);
        assert!(matches!(
            service_detail_query("123"),
            Err(AppError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_booking_listing_ownership() {
        let owner = claims(json!({ "email": "a@x.com" }));

        assert!(authorize_booking_listing(&owner, Some("a@x.com")).is_ok());
        assert!(matches!(
            authorize_booking_listing(&owner, Some("b@x.com")),
            Err(AppError::Forbidden)
        ));
        assert!(authorize_booking_listing(&owner, None).is_err());
    }

    #[test]
    fn test_booking_listing_without_email_claim() {
        let anonymous = claims(json!({ "name": "x" }));
        assert!(authorize_booking_listing(&anonymous, None).is_ok());
        assert!(authorize_booking_listing(&anonymous, Some("a@x.com")).is_err());

        let numeric = claims(json!({ "email": 7 }));
        assert!(authorize_booking_listing(&numeric, None).is_err());
    }

    #[test]
    fn test_booking_list_query() {
        let filtered = booking_list_query(&BookingListParams {
            email: Some("a@x.com".to_string()),
        });
        assert_eq!(
            filtered.filter,
            Filter::Eq {
                field: "email".to_string(),
                value: "a@x.com".to_string()
            }
        );

        assert_eq!(booking_list_query(&BookingListParams::default()), FindQuery::all());
    }

    #[test]
    fn test_booking_status_update_only_sets_status() {
        let set = booking_status_update(UpdateBookingStatusRequest {
            status: "confirmed".to_string(),
        });

        assert_eq!(set.len(), 1);
        assert_eq!(set["status"], json!("confirmed"));
    }
}
