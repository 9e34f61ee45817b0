//! Chat server configuration

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::{SessionResolver, StoreSessionResolver, DEFAULT_SESSION_COOKIES};
use crate::realtime::{MemoryPublisher, Publisher, PusherConfig, PusherPublisher, RedisPublisher};
use crate::store::{KvStore, MemoryStore, RedisStore};

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("incomplete Pusher configuration, missing {0}")]
    IncompletePusher(&'static str),
}

/// Configuration for the Chat Server
#[derive(Clone, Debug)]
pub struct ChatServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Redis connection URL; `None` keeps all data in process memory
    pub redis_url: Option<String>,
    /// Pusher credentials; when absent events go through Redis or memory
    pub pusher: Option<PusherConfig>,
    /// Cookie names that may carry the session token, in lookup order
    pub session_cookies: Vec<String>,
}

impl Default for ChatServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            redis_url: None,
            pusher: None,
            session_cookies: DEFAULT_SESSION_COOKIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ChatServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    name: "BIND_ADDR",
                    value: addr.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        config.redis_url = var("REDIS_URL");

        let pusher_vars = [
            ("PUSHER_APP_ID", var("PUSHER_APP_ID")),
            ("PUSHER_KEY", var("PUSHER_KEY")),
            ("PUSHER_SECRET", var("PUSHER_SECRET")),
            ("PUSHER_CLUSTER", var("PUSHER_CLUSTER")),
        ];
        if pusher_vars.iter().any(|(_, v)| v.is_some()) {
            if let Some((missing, _)) = pusher_vars.iter().find(|(_, v)| v.is_none()) {
                return Err(ConfigError::IncompletePusher(*missing));
            }
            let [app_id, key, secret, cluster] = pusher_vars.map(|(_, v)| v.unwrap_or_default());
            config.pusher = Some(PusherConfig {
                app_id,
                key,
                secret,
                cluster,
                host: var("PUSHER_HOST"),
            });
        }

        if let Some(names) = var("SESSION_COOKIE_NAMES") {
            config.session_cookies = names
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(config)
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub publisher: Arc<dyn Publisher>,
    pub sessions: Arc<dyn SessionResolver>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        publisher: Arc<dyn Publisher>,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        Self {
            store,
            publisher,
            sessions,
        }
    }

    /// Connect the backends selected by `config`.
    pub async fn from_config(config: &ChatServerConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn KvStore> = match &config.redis_url {
            Some(url) => Arc::new(RedisStore::connect(url).await?),
            None => {
                warn!("[Store] REDIS_URL not set, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let publisher: Arc<dyn Publisher> = match (&config.pusher, &config.redis_url) {
            (Some(pusher), _) => {
                info!("[Realtime] Publishing through Pusher app {}", pusher.app_id);
                Arc::new(PusherPublisher::new(pusher.clone()))
            }
            (None, Some(url)) => {
                info!("[Realtime] Publishing through Redis PUBLISH");
                Arc::new(RedisPublisher::connect(url).await?)
            }
            (None, None) => {
                warn!("[Realtime] No transport configured, events stay in process");
                Arc::new(MemoryPublisher::new())
            }
        };

        let sessions = Arc::new(StoreSessionResolver::with_cookie_names(
            store.clone(),
            config.session_cookies.clone(),
        ));

        Ok(Self::new(store, publisher, sessions))
    }
}
