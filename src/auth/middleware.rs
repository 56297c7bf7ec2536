//! Bearer 令牌认证中间件

use crate::{
    auth::jwt::{Claims, TokenService},
    error::AppError,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// 从 Authorization 头提取令牌
///
/// 取头部值中以空白分隔的第二段，即去掉 `Bearer` 前缀。
/// 缺少头部返回 `MissingToken`，缺少第二段返回 `Unauthorized`。
pub fn extract_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AppError::MissingToken)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    value
        .split_whitespace()
        .nth(1)
        .map(str::to_string)
        .ok_or(AppError::Unauthorized)
}

/// 令牌认证中间件 - 必须认证
pub async fn jwt_auth_middleware(
    State(token_service): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(req.headers())?;
    let claims = token_service.verify(&token)?;

    tracing::debug!(email = ?claims.email(), "Bearer token verified");

    req.extensions_mut().insert(AuthContext { claims });

    Ok(next.run(req).await)
}
