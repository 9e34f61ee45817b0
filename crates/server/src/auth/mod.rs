//! Session resolution
//!
//! Sessions are created by the identity provider and stored in the key-value
//! store as `user:session:<token>` JSON records. This module only reads them:
//! it finds the token on the request, loads the record and checks expiry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::keys;
use crate::store::KvStore;

/// Cookies the identity provider sets, plain and `__Secure-` prefixed.
pub const DEFAULT_SESSION_COOKIES: [&str; 2] = [
    "next-auth.session-token",
    "__Secure-next-auth.session-token",
];

/// Session record as written by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_token: String,
    pub user_id: String,
    pub expires: DateTime<Utc>,
}

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` when the request carries no valid session.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>>;
}

/// Resolves sessions from the key-value store.
pub struct StoreSessionResolver {
    store: Arc<dyn KvStore>,
    cookie_names: Vec<String>,
}

impl StoreSessionResolver {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self::with_cookie_names(
            store,
            DEFAULT_SESSION_COOKIES.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_cookie_names(store: Arc<dyn KvStore>, cookie_names: Vec<String>) -> Self {
        Self {
            store,
            cookie_names,
        }
    }

    /// Bearer token first, then the configured cookies in order.
    pub fn token_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        if let Some(token) = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return Some(token.to_string());
        }

        let cookies: Vec<(&str, &str)> = headers
            .get_all(http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .collect();

        self.cookie_names.iter().find_map(|name| {
            cookies
                .iter()
                .find(|(key, value)| *key == name.as_str() && !value.is_empty())
                .map(|(_, value)| value.to_string())
        })
    }
}

#[async_trait]
impl SessionResolver for StoreSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>> {
        let Some(token) = self.token_from_headers(headers) else {
            return Ok(None);
        };

        let Some(raw) = self.store.get(&keys::session(&token)).await? else {
            debug!("[Auth] Unknown session token");
            return Ok(None);
        };

        let record: SessionRecord = serde_json::from_str(&raw)?;
        if record.expires <= Utc::now() {
            debug!("[Auth] Session for {} expired at {}", record.user_id, record.expires);
            return Ok(None);
        }

        Ok(Some(Session::new(record.user_id)))
    }
}
