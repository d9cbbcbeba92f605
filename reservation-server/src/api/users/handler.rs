//! User Profile Handlers
//!
//! Profile read/update (multipart with optional avatar) and the demo
//! subscription payment flow.

use axum::{
    Json,
    extract::{Multipart, State},
};
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;
use std::path::PathBuf;
use uuid::Uuid;

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserProfileUpdate;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NAME_LEN, MIN_PHONE_LEN, validate_min_len, validate_required_text,
};
use shared::ErrorCode;
use shared::client::{
    ActivateSubscriptionRequest, ProfileResponse, SubscriptionInfo, SubscriptionResponse,
    SubscriptionStatus, SubscriptionTier,
};

/// Premium runs for one year from activation
const SUBSCRIPTION_PERIOD_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Supported avatar formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for re-encoded avatars
const JPEG_QUALITY: u8 = 85;

/// GET /api/users/me
pub async fn profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let account = state
        .users()
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

    Ok(Json(ProfileResponse {
        user: account.to_info(),
    }))
}

/// PUT /api/users/me
///
/// Multipart form: optional `firstName` / `lastName` / `phone` text fields
/// plus an optional `avatar` image. The avatar is validated, re-encoded to
/// JPEG and stored under `work_dir/uploads/avatars/<uuid>.jpg`.
pub async fn update_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ProfileResponse>, AppError> {
    let mut update = UserProfileUpdate::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {}", e)))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };

        match name.as_str() {
            "firstName" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                validate_required_text(&value, "firstName", MAX_NAME_LEN)?;
                update.first_name = Some(value);
            }
            "lastName" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                validate_required_text(&value, "lastName", MAX_NAME_LEN)?;
                update.last_name = Some(value);
            }
            "phone" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?;
                validate_min_len(&value, "phone", MIN_PHONE_LEN)?;
                update.phone = Some(value);
            }
            "avatar" => {
                let filename = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {}", e)))?
                    .to_vec();
                update.avatar_url = Some(store_avatar(&state, filename, data)?);
            }
            _ => {}
        }
    }

    let updated = state.users().update_profile(&user.id, update).await?;

    tracing::info!(user = %user.id, "Profile updated");

    Ok(Json(ProfileResponse {
        user: updated.to_info(),
    }))
}

/// POST /api/users/subscription/activate
///
/// Demo payment: every field must be present and the card number must
/// carry at least 12 digits. No charge happens anywhere.
pub async fn activate_subscription(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ActivateSubscriptionRequest>,
) -> Result<Json<SubscriptionResponse>, AppError> {
    if req.card_number.trim().is_empty()
        || req.card_holder.trim().is_empty()
        || req.expiry.trim().is_empty()
        || req.cvc.trim().is_empty()
    {
        return Err(AppError::new(ErrorCode::PaymentDetailsIncomplete));
    }

    let digits = req.card_number.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 12 {
        return Err(AppError::new(ErrorCode::InvalidCardNumber));
    }

    let now = now_millis();
    let subscription = SubscriptionInfo {
        tier: SubscriptionTier::Premium,
        status: SubscriptionStatus::Active,
        started_at: Some(now),
        expires_at: Some(now + SUBSCRIPTION_PERIOD_MS),
    };

    let updated = state
        .users()
        .set_subscription(&user.id, subscription)
        .await?;

    tracing::info!(user = %user.id, "Subscription activated");

    Ok(Json(SubscriptionResponse {
        message: "Subscription activated".to_string(),
        subscription: updated.subscription,
    }))
}

/// POST /api/users/subscription/cancel
pub async fn cancel_subscription(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<SubscriptionResponse>, AppError> {
    let updated = state
        .users()
        .set_subscription(&user.id, SubscriptionInfo::default())
        .await?;

    tracing::info!(user = %user.id, "Subscription cancelled");

    Ok(Json(SubscriptionResponse {
        message: "Subscription cancelled".to_string(),
        subscription: updated.subscription,
    }))
}

/// Validate, re-encode and persist an avatar image; returns the public URL
fn store_avatar(
    state: &ServerState,
    filename: Option<String>,
    data: Vec<u8>,
) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::validation("Empty avatar file"));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!(
                "Avatar exceeds the {} byte limit",
                state.config.max_upload_bytes
            ),
        ));
    }

    if let Some(name) = &filename {
        let ext = PathBuf::from(name)
            .extension()
            .and_then(|e| e.to_str().map(|s| s.to_lowercase()));
        match ext {
            Some(ext) if SUPPORTED_FORMATS.contains(&ext.as_str()) => {}
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::UnsupportedFileFormat,
                    format!("Supported formats: {}", SUPPORTED_FORMATS.join(", ")),
                ));
            }
        }
    }

    // Decode to prove it is a real image, then re-encode as JPEG
    let img = image::load_from_memory(&data)
        .map_err(|e| AppError::with_message(ErrorCode::InvalidImageFile, e.to_string()))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to encode avatar: {}", e)))?;
    }

    let avatars_dir = state.config.uploads_dir().join("avatars");
    std::fs::create_dir_all(&avatars_dir)
        .map_err(|e| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()))?;

    let stored_name = format!("{}.jpg", Uuid::new_v4());
    std::fs::write(avatars_dir.join(&stored_name), &buffer)
        .map_err(|e| AppError::with_message(ErrorCode::FileStorageFailed, e.to_string()))?;

    Ok(format!("/uploads/avatars/{}", stored_name))
}
