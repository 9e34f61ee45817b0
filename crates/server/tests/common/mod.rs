#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use server::auth::{SessionRecord, StoreSessionResolver};
use server::config::AppState;
use server::error::{Error, Result};
use server::keys;
use server::models::User;
use server::realtime::{MemoryPublisher, PublishedEvent, Publisher};
use server::store::{KvStore, MemoryStore};

/// Ordered record of every write and publish the handlers performed.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Memory store that journals writes and can be told to fail operations.
pub struct RecordingStore {
    pub inner: MemoryStore,
    journal: Journal,
    failing: Mutex<Vec<&'static str>>,
}

impl RecordingStore {
    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().contains(&op) {
            return Err(Error::Store(format!("{} unavailable", op)));
        }
        Ok(())
    }

    fn record(&self, entry: String) {
        self.journal.lock().push(entry);
    }
}

#[async_trait]
impl KvStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check("get")?;
        self.inner.get(key).await
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool> {
        self.check("sismember")?;
        self.inner.sismember(key, member).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        self.check("smembers")?;
        self.inner.smembers(key).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<()> {
        self.check("sadd")?;
        self.record(format!("sadd {} {}", key, member));
        self.inner.sadd(key, member).await
    }

    async fn srem(&self, key: &str, member: &str) -> Result<()> {
        self.check("srem")?;
        self.record(format!("srem {} {}", key, member));
        self.inner.srem(key, member).await
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<()> {
        self.check("zadd")?;
        self.record(format!("zadd {}", key));
        self.inner.zadd(key, score, member).await
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.inner.zrange(key, start, stop).await
    }
}

/// Memory publisher that journals publishes and can be made to fail.
pub struct RecordingPublisher {
    pub inner: MemoryPublisher,
    journal: Journal,
    failing: Mutex<bool>,
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn trigger(&self, channel: &str, event: &str, payload: &Value) -> Result<()> {
        if *self.failing.lock() {
            return Err(Error::Publish("realtime transport unavailable".into()));
        }
        self.journal.lock().push(format!("publish {} {}", event, channel));
        self.inner.trigger(channel, event, payload).await
    }
}

pub struct TestApp {
    pub store: Arc<RecordingStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub journal: Journal,
    app: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let journal: Journal = Arc::default();
        let store = Arc::new(RecordingStore {
            inner: MemoryStore::new(),
            journal: journal.clone(),
            failing: Mutex::new(Vec::new()),
        });
        let publisher = Arc::new(RecordingPublisher {
            inner: MemoryPublisher::new(),
            journal: journal.clone(),
            failing: Mutex::new(false),
        });
        let sessions = Arc::new(StoreSessionResolver::new(store.clone()));
        let state = AppState::new(store.clone(), publisher.clone(), sessions);

        Self {
            store,
            publisher,
            journal,
            app: server::router(state),
        }
    }

    /// Store a profile for `id` and a live session for it. Returns the token.
    pub fn add_user(&self, id: &str, name: &str) -> String {
        let user = user(id, name);
        self.store
            .inner
            .set(keys::user(id), serde_json::to_string(&user).unwrap());

        let token = format!("token-{}", id);
        let record = SessionRecord {
            session_token: token.clone(),
            user_id: id.to_string(),
            expires: Utc::now() + Duration::days(30),
        };
        self.store
            .inner
            .set(keys::session(&token), serde_json::to_string(&record).unwrap());
        token
    }

    /// Store `profile` verbatim as the record for `id`.
    pub fn set_profile(&self, id: &str, profile: Value) {
        self.store.inner.set(keys::user(id), profile.to_string());
    }

    /// Record that `from` asked `to` to be friends.
    pub async fn request_friendship(&self, from: &str, to: &str) {
        self.store
            .inner
            .sadd(&keys::incoming_friend_requests(to), from)
            .await
            .unwrap();
    }

    pub async fn make_friends(&self, a: &str, b: &str) {
        self.store.inner.sadd(&keys::friends(a), b).await.unwrap();
        self.store.inner.sadd(&keys::friends(b), a).await.unwrap();
    }

    pub fn fail_store_op(&self, op: &'static str) {
        self.store.failing.lock().push(op);
    }

    pub fn fail_publishes(&self) {
        *self.publisher.failing.lock() = true;
    }

    pub fn events(&self) -> Vec<PublishedEvent> {
        self.publisher.inner.events()
    }

    pub fn writes(&self) -> Vec<String> {
        self.journal.lock().clone()
    }

    pub async fn is_member(&self, key: &str, member: &str) -> bool {
        self.store.inner.sismember(key, member).await.unwrap()
    }

    pub async fn messages(&self, chat_id: &str) -> Vec<Value> {
        self.store
            .inner
            .zrange(&keys::chat_messages(chat_id), 0, -1)
            .await
            .unwrap()
            .iter()
            .map(|raw| serde_json::from_str(raw).unwrap())
            .collect()
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &str) -> (StatusCode, String) {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(request.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", id)),
        image: Some(format!("https://img.example.com/{}.png", id)),
        extra: Default::default(),
    }
}
