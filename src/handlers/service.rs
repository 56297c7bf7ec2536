//! 服务项目的 HTTP 处理器
//! 文档原样返回，不做类型转换

use crate::{
    error::AppError,
    middleware::AppState,
    query::{service_detail_query, service_list_query, ServiceListParams},
    store::{Collection, Document},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

/// 列出服务项目
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ServiceListParams>,
) -> Result<Json<Vec<Document>>, AppError> {
    tracing::debug!(search = ?params.search, sort = ?params.sort, "Listing services");

    let query = service_list_query(&params);
    let services = state.store.find(Collection::Services, &query).await?;

    Ok(Json(services))
}

/// 获取服务项目详情（投影字段），不存在时返回 null
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Option<Document>>, AppError> {
    let query = service_detail_query(&id)?;

    let service = state
        .store
        .find_one(Collection::Services, query.id, Some(&query.projection))
        .await?;

    Ok(Json(service))
}
