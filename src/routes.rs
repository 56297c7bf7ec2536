//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::{auth::jwt_auth_middleware, handlers, middleware::AppState};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let require_token =
        middleware::from_fn_with_state(state.token_service.clone(), jwt_auth_middleware);

    // 存活探针
    let public_routes = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 令牌签发
    let auth_routes = Router::new().route("/jwt", post(handlers::auth::issue_token));

    let service_routes = Router::new()
        .route("/services", get(handlers::service::list_services))
        .route("/services/{id}", get(handlers::service::get_service));

    // 只有列表需要令牌，创建/更新/删除不做认证
    let booking_routes = Router::new()
        .route(
            "/bookings",
            get(handlers::booking::list_bookings)
                .route_layer(require_token)
                .post(handlers::booking::create_booking),
        )
        .route(
            "/bookings/{id}",
            patch(handlers::booking::update_booking_status)
                .delete(handlers::booking::delete_booking),
        );

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(service_routes)
        .merge(booking_routes)
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
