//! 预约请求模型
//!
//! 预约以无模式文档原样入库，这里只定义入口处的校验。

use crate::{error::AppError, store::Document};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

/// 新预约的联系方式校验
#[derive(Debug, Clone, Validate)]
pub struct BookingContact {
    #[validate(email)]
    pub email: String,
}

impl BookingContact {
    /// 从请求文档中读取 `email` 字段，其余字段不做检查
    pub fn from_document(doc: &Document) -> Result<Self, AppError> {
        match doc.get("email") {
            Some(Value::String(email)) => Ok(Self {
                email: email.clone(),
            }),
            Some(_) => Err(AppError::Validation("email must be a string".to_string())),
            None => Err(AppError::Validation("email is required".to_string())),
        }
    }
}

/// 校验新预约文档，返回通过校验的邮箱
pub fn validate_new_booking(doc: &Document) -> Result<String, AppError> {
    let contact = BookingContact::from_document(doc)?;
    contact.validate()?;
    Ok(contact.email)
}

/// 更新预约状态请求
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBookingStatusRequest {
    #[validate(length(min = 1, max = 64))]
    pub status: String,
}
