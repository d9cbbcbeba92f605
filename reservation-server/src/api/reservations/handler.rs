//! Reservation API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use shared::client::{
    CreateReservationRequest, ReservationListResponse, ReservationResponse,
    UpdateReservationStatusRequest,
};

/// GET /api/reservations - 当前用户的预订列表 + 常用桌台
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<ReservationListResponse>, AppError> {
    let (reservations, favorites) = state.reservations.list(&user.id).await?;

    Ok(Json(ReservationListResponse {
        reservations: reservations.iter().map(|r| r.to_dto()).collect(),
        favorites,
    }))
}

/// POST /api/reservations - 创建预订 (201)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationResponse>), AppError> {
    let reservation = state.reservations.create(&user.id, req).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReservationResponse {
            reservation: reservation.to_dto(),
        }),
    ))
}

/// DELETE /api/reservations/:id - 取消本人预订 (非本人 404)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.reservations.cancel(&user.id, &id).await?;

    Ok(Json(ReservationResponse {
        reservation: reservation.to_dto(),
    }))
}

/// PATCH /api/reservations/:id/status - 无条件设置状态
pub async fn update_status(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateReservationStatusRequest>,
) -> Result<Json<ReservationResponse>, AppError> {
    let reservation = state.reservations.update_status(&id, req.status).await?;

    Ok(Json(ReservationResponse {
        reservation: reservation.to_dto(),
    }))
}
