//! HTTP handlers
//!
//! Each handler parses its body, resolves the caller's session, checks
//! relationship state, then mutates the store and publishes notifications.

pub mod friends;
pub mod message;

pub use crate::config::AppState;

pub use friends::accept_friend_request;
pub use message::send_message;

use tracing::{error, info};

use crate::error::{ApiError, Endpoint, Error, ErrorClass, Result};
use crate::keys;
use crate::models::User;
use crate::store::KvStore;

/// Load and decode the profile stored under `user:<id>`.
pub async fn load_user(store: &dyn KvStore, id: &str) -> Result<User> {
    let raw = store
        .get(&keys::user(id))
        .await?
        .ok_or_else(|| Error::Internal(format!("user {} not found", id)))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Log a handler failure and attach the endpoint for the response mapping.
fn reject(endpoint: Endpoint, err: Error) -> ApiError {
    match err.class() {
        ErrorClass::Internal => error!("POST {} failed: {}", endpoint.path(), err),
        _ => info!("POST {} rejected: {}", endpoint.path(), err),
    }
    err.at(endpoint)
}
