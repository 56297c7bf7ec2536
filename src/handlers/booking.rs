//! 预约的 HTTP 处理器

use crate::{
    auth::AuthContext,
    error::AppError,
    middleware::AppState,
    models::{validate_new_booking, UpdateBookingStatusRequest},
    query::{
        authorize_booking_listing, booking_list_query, booking_status_update, BookingListParams,
    },
    store::{Collection, DeleteResult, Document, DocumentId, InsertOneResult, UpdateResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use validator::Validate;

/// 列出预约（需认证，只能查看自己的预约）
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    auth_context: AuthContext,
    Query(params): Query<BookingListParams>,
) -> Result<Json<Vec<Document>>, AppError> {
    authorize_booking_listing(&auth_context.claims, params.email.as_deref())?;

    let query = booking_list_query(&params);
    let bookings = state.store.find(Collection::Bookings, &query).await?;

    tracing::debug!(email = ?params.email, count = bookings.len(), "Listed bookings");

    Ok(Json(bookings))
}

/// 创建预约（请求体原样入库）
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(booking): Json<Document>,
) -> Result<Json<InsertOneResult>, AppError> {
    let email = validate_new_booking(&booking)?;

    let result = state.store.insert_one(Collection::Bookings, booking).await?;

    tracing::info!(id = %result.inserted_id, email = %email, "Booking created");

    Ok(Json(result))
}

/// 更新预约状态（只修改 status 字段）
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<UpdateResult>, AppError> {
    let id: DocumentId = id.parse()?;
    req.validate()?;

    let status = req.status.clone();
    let result = state
        .store
        .update_one(Collection::Bookings, id, booking_status_update(req))
        .await?;

    tracing::info!(
        id = %id,
        status = %status,
        matched = result.matched_count,
        modified = result.modified_count,
        "Booking status updated"
    );

    Ok(Json(result))
}

/// 删除预约
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id: DocumentId = id.parse()?;

    let result = state.store.delete_one(Collection::Bookings, id).await?;

    tracing::info!(id = %id, deleted = result.deleted_count, "Booking deleted");

    Ok(Json(result))
}
