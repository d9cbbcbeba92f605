//! User Profile API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/me", get(handler::profile).put(handler::update_profile))
        .route(
            "/subscription/activate",
            post(handler::activate_subscription),
        )
        .route("/subscription/cancel", post(handler::cancel_subscription))
}
