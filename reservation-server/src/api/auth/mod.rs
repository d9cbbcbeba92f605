//! Auth API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/verify", get(handler::verify))
        .route("/login", post(handler::login))
        .route("/refresh", post(handler::refresh))
        .route("/oauth", post(handler::oauth))
}
