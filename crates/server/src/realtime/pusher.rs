//! Pusher Channels HTTP API client
//!
//! Events are sent with `POST /apps/{app_id}/events`, signed as the Pusher
//! REST API requires: the sorted auth query parameters, the request method
//! and path are HMAC-SHA256 signed with the app secret, and the body is
//! pinned by its MD5 digest.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::{debug, warn};

use super::Publisher;
use crate::error::{Error, Result};
use crate::keys::to_pusher_key;

type HmacSha256 = Hmac<Sha256>;

const AUTH_VERSION: &str = "1.0";

#[derive(Debug, Clone)]
pub struct PusherConfig {
    pub app_id: String,
    pub key: String,
    pub secret: String,
    pub cluster: String,
    /// Override for the API base URL (self-hosted Pusher-compatible servers).
    pub host: Option<String>,
}

impl PusherConfig {
    pub fn base_url(&self) -> String {
        match &self.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://api-{}.pusher.com", self.cluster),
        }
    }

    pub fn events_path(&self) -> String {
        format!("/apps/{}/events", self.app_id)
    }
}

#[derive(Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
    channels: Vec<String>,
    data: String,
}

pub struct PusherPublisher {
    config: PusherConfig,
    client: reqwest::Client,
}

impl PusherPublisher {
    pub fn new(config: PusherConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn trigger_body(channel: &str, event: &str, payload: &Value) -> Result<String> {
        let body = TriggerBody {
            name: event,
            channels: vec![to_pusher_key(channel)],
            data: payload.to_string(),
        };
        Ok(serde_json::to_string(&body)?)
    }
}

/// Query string for a signed request, including `auth_signature`.
pub fn signed_query(
    key: &str,
    secret: &str,
    method: &str,
    path: &str,
    timestamp: i64,
    body: &str,
) -> Result<String> {
    let body_md5 = format!("{:x}", md5::compute(body.as_bytes()));
    // Parameter names are already in lexicographic order.
    let query = format!(
        "auth_key={}&auth_timestamp={}&auth_version={}&body_md5={}",
        key, timestamp, AUTH_VERSION, body_md5
    );
    let signature = sign(secret, &string_to_sign(method, path, &query))?;
    Ok(format!("{}&auth_signature={}", query, signature))
}

pub fn string_to_sign(method: &str, path: &str, query: &str) -> String {
    format!("{}\n{}\n{}", method, path, query)
}

fn sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| Error::Internal(format!("invalid Pusher secret: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl Publisher for PusherPublisher {
    async fn trigger(&self, channel: &str, event: &str, payload: &Value) -> Result<()> {
        let body = Self::trigger_body(channel, event, payload)?;
        let path = self.config.events_path();
        let query = signed_query(
            &self.config.key,
            &self.config.secret,
            "POST",
            &path,
            chrono::Utc::now().timestamp(),
            &body,
        )?;
        let url = format!("{}{}?{}", self.config.base_url(), path, query);

        let response = self
            .client
            .post(url)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Publish(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("[Realtime] Pusher rejected {} on {}: {} {}", event, channel, status, text);
            return Err(Error::Publish(format!("Pusher responded {}: {}", status, text)));
        }

        debug!("[Realtime] {} -> {}", event, channel);
        Ok(())
    }
}
