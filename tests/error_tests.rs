//! 错误处理单元测试
//!
//! 测试应用错误类型的状态码与响应格式

use axum::{http::StatusCode, response::IntoResponse};
use car_doctor::error::{AppError, ErrorResponse};
use http_body_util::BodyExt;

async fn envelope(error: AppError) -> (StatusCode, ErrorResponse) {
    let response = error.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ==================== 错误状态码测试 ====================

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(
        AppError::InvalidIdentifier("x".to_string()).status_code(),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(AppError::Validation("error".to_string()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        AppError::Database(sqlx::Error::PoolTimedOut).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::Config("Invalid config".to_string()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// ==================== 响应格式测试 ====================

#[tokio::test]
async fn test_unauthorized_envelope() {
    let (status, body) = envelope(AppError::MissingToken).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.error);
    assert_eq!(body.message, "unauthorized access");
}

#[tokio::test]
async fn test_forbidden_envelope_uses_boolean_flag() {
    let (status, body) = envelope(AppError::Forbidden).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.error);
    assert_eq!(body.message, "Forbidden access");
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let (status, body) = envelope(AppError::Database(sqlx::Error::PoolTimedOut)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.message, "Database error occurred");
    assert!(!body.message.to_lowercase().contains("pool"));
}

#[tokio::test]
async fn test_invalid_identifier_hides_input() {
    let (status, body) = envelope(AppError::InvalidIdentifier("<script>".to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.message, "Invalid identifier");
}
