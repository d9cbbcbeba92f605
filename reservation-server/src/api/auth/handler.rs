//! Authentication Handlers
//!
//! Handles register, verification, login, token refresh and OAuth.

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppError;
use crate::core::ServerState;
use crate::db::models::{User, UserCreate};
use crate::utils::validation::{
    MAX_NAME_LEN, MIN_NAME_LEN, MIN_PASSWORD_LEN, MIN_PHONE_LEN, validate_email, validate_min_len,
    validate_required_text,
};

// Re-use shared DTOs for API consistency
use shared::client::{
    LoginRequest, LoginResponse, OAuthRequest, RefreshRequest, RefreshResponse, RegisterRequest,
    RegisterResponse, RegisteredUser,
};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// POST /api/auth/register
///
/// Creates an unverified account and sends the verification mail
/// (best-effort, a mail failure does not fail the request).
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validate_required_text(&req.first_name, "firstName", MAX_NAME_LEN)?;
    validate_min_len(&req.first_name, "firstName", MIN_NAME_LEN)?;
    validate_required_text(&req.last_name, "lastName", MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_min_len(&req.phone, "phone", MIN_PHONE_LEN)?;
    validate_min_len(&req.password, "password", MIN_PASSWORD_LEN)?;

    let password_hash = User::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
    let verification_token = Uuid::new_v4().to_string();

    let user = state
        .users()
        .create(UserCreate {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            password_hash,
            verification_token: Some(verification_token.clone()),
            is_verified: false,
        })
        .await?;

    if let Err(e) = state
        .mailer
        .send_verification_email(&user.email, &user.first_name, &verification_token)
        .await
    {
        tracing::warn!(error = %e, email = %user.email, "Failed to send verification email");
    }

    tracing::info!(email = %user.email, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "Registration successful. Please verify your email.".to_string(),
            user: RegisteredUser {
                id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
                email: user.email,
                is_verified: user.is_verified,
            },
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

/// GET /api/auth/verify?token=...
pub async fn verify(
    State(state): State<ServerState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<RegisterResponse>, AppError> {
    if query.token.trim().is_empty() {
        return Err(AppError::new(
            shared::ErrorCode::VerificationTokenInvalid,
        ));
    }

    let user = state
        .users()
        .verify_by_token(&query.token)
        .await?
        .ok_or_else(|| AppError::new(shared::ErrorCode::VerificationTokenInvalid))?;

    tracing::info!(email = %user.email, "Account verified");

    Ok(Json(RegisterResponse {
        message: "Account verified. You can now log in.".to_string(),
        user: RegisteredUser {
            id: user.id.as_ref().map(|t| t.to_string()).unwrap_or_default(),
            email: user.email,
            is_verified: user.is_verified,
        },
    }))
}

/// POST /api/auth/login
///
/// `identifier` accepts email or phone.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = state.users().find_by_identifier(&req.identifier).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent account enumeration
    let user = match user {
        Some(u) => {
            let password_valid = u
                .verify_password(&req.password)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                tracing::warn!(identifier = %req.identifier, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            tracing::warn!(identifier = %req.identifier, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !user.is_verified {
        return Err(AppError::new(shared::ErrorCode::EmailNotVerified));
    }

    let (token, refresh_token) = issue_token_pair(&state, &user)?;

    tracing::info!(email = %user.email, "User logged in");

    Ok(Json(LoginResponse {
        token,
        refresh_token,
        user: user.to_info(),
    }))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AppError> {
    let jwt_service = state.get_jwt_service();
    let claims = jwt_service
        .validate_refresh_token(&req.refresh_token)
        .map_err(|e| match e {
            crate::auth::JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid refresh token"),
        })?;

    // The account may have been removed since the token was issued
    let user = state
        .users()
        .find_by_id(&claims.sub)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown account"))?;

    let (token, refresh_token) = issue_token_pair(&state, &user)?;

    Ok(Json(RefreshResponse {
        token,
        refresh_token,
    }))
}

/// POST /api/auth/oauth
///
/// Find-or-create flow: an existing account with the provider email is
/// reused, otherwise a verified account with a random password is created.
pub async fn oauth(
    State(state): State<ServerState>,
    Json(req): Json<OAuthRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_required_text(&req.provider, "provider", MAX_NAME_LEN)?;
    validate_email(&req.email)?;

    let users = state.users();
    let user = match users.find_by_email(&req.email).await? {
        Some(u) => u,
        None => {
            // Random credentials; the account can only be entered via OAuth
            let password_hash = User::hash_password(&Uuid::new_v4().to_string())
                .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

            users
                .create(UserCreate {
                    first_name: req.first_name,
                    last_name: req.last_name,
                    email: req.email,
                    // Placeholder until the user fills a real phone in
                    phone: format!("oauth-{}-{}", req.provider, req.oauth_id),
                    password_hash,
                    verification_token: None,
                    is_verified: true,
                })
                .await?
        }
    };

    let (token, refresh_token) = issue_token_pair(&state, &user)?;

    tracing::info!(email = %user.email, provider = %req.provider, "OAuth login");

    Ok(Json(LoginResponse {
        token,
        refresh_token,
        user: user.to_info(),
    }))
}

fn issue_token_pair(state: &ServerState, user: &User) -> Result<(String, String), AppError> {
    let jwt_service = state.get_jwt_service();
    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();

    let token = jwt_service
        .generate_access_token(&user_id, &user.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = jwt_service
        .generate_refresh_token(&user_id, &user.email)
        .map_err(|e| AppError::internal(format!("Token generation failed: {}", e)))?;

    Ok((token, refresh_token))
}
