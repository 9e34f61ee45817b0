//! Router
//!
//! Binds the handlers to their routes and adds the shared HTTP layers.

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::AppState;
use crate::error::Endpoint;
use crate::handlers::{accept_friend_request, send_message};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(Endpoint::AcceptFriend.path(), post(accept_friend_request))
        .route(Endpoint::SendMessage.path(), post(send_message))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}
