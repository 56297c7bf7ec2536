//! 令牌签发处理器

use crate::{auth::TokenResponse, error::AppError, middleware::AppState};
use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

/// 签发访问令牌
///
/// 请求体是任意声明对象，通常至少包含 email。
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<TokenResponse>, AppError> {
    let Value::Object(claims) = body else {
        return Err(AppError::BadRequest("claims must be a JSON object".to_string()));
    };

    tracing::info!(email = ?claims.get("email"), "Issuing access token");

    let token = state.token_service.issue(claims)?;

    Ok(Json(TokenResponse { token }))
}
