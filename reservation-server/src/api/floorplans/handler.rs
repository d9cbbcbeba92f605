//! Floorplan API Handlers

use axum::{
    Json,
    extract::{Path, Query},
};
use serde::Deserialize;

use crate::AppError;
use crate::floorplans;
use shared::client::{AvailabilityResponse, FloorplanListResponse};

/// GET /api/floorplans - 平面图目录
pub async fn list() -> Json<FloorplanListResponse> {
    Json(FloorplanListResponse {
        floorplans: floorplans::catalog(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_slot: Option<String>,
}

/// GET /api/floorplans/:id/availability - 桌台可用性采样
pub async fn availability(
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    if let Some(date) = &query.date {
        crate::utils::time::parse_date(date)?;
    }
    if let Some(slot) = &query.time_slot {
        crate::utils::time::parse_time_slot(slot)?;
    }

    let response = floorplans::availability(&id)
        .ok_or_else(|| AppError::not_found(format!("Floorplan {} not found", id)))?;

    Ok(Json(response))
}
