//! Records stored in the key-value store and request bodies.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Separator between the two participant ids of a chat id.
pub const CHAT_ID_SEPARATOR: &str = "--";

/// User profile as stored under `user:<id>`.
///
/// The identity provider writes `null` for fields it has no value for, and
/// may store fields this service does not know about. Both survive a
/// deserialize/serialize round trip, so published profiles match the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A chat message, stored as a member of `chat:<chatId>:messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    /// Spelling is part of the stored format.
    pub reciver_id: String,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// A message as assembled from request input, before schema validation.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub id: String,
    pub sender_id: String,
    pub reciver_id: String,
    pub text: Option<Value>,
    pub timestamp: i64,
}

impl MessageDraft {
    /// Check the draft against the message schema.
    pub fn validate(self) -> Result<Message> {
        let text = match self.text {
            Some(Value::String(text)) => text,
            Some(other) => {
                return Err(Error::Schema(format!(
                    "text: Expected string, received {}",
                    json_kind(&other)
                )))
            }
            None => return Err(Error::Schema("text: Required".to_string())),
        };

        Ok(Message {
            id: self.id,
            sender_id: self.sender_id,
            reciver_id: self.reciver_id,
            text,
            timestamp: self.timestamp,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Chat-list preview sent to the receiver's `user:<id>:chats` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageNotification {
    #[serde(flatten)]
    pub message: Message,
    pub sender_img: Option<String>,
    pub sender_name: Option<String>,
}

/// Composite conversation id of the form `lesserId--greaterId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatId(String);

impl ChatId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first two segments around the separator. Extra segments are ignored.
    pub fn participants(&self) -> (&str, Option<&str>) {
        let mut parts = self.0.split(CHAT_ID_SEPARATOR);
        let first = parts.next().unwrap_or_default();
        (first, parts.next())
    }

    /// The participant that is not `caller`.
    ///
    /// Fails with [`Error::Forbidden`] when the caller is not one of the
    /// participants, or when the id has no second participant.
    pub fn counterpart(&self, caller: &str) -> Result<&str> {
        let (first, second) = self.participants();
        if caller == first {
            second.ok_or(Error::Forbidden)
        } else if second == Some(caller) {
            Ok(first)
        } else {
            Err(Error::Forbidden)
        }
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `POST /api/friends/accept`.
#[derive(Debug, Clone)]
pub struct AcceptFriendInput {
    /// Id of the user whose request is being accepted.
    pub id_to_add: String,
}

impl AcceptFriendInput {
    /// Parse and validate the body. Malformed JSON surfaces as [`Error::Json`];
    /// well-formed JSON without a string `id` as [`Error::InvalidPayload`].
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        match value.get("id") {
            Some(Value::String(id)) => Ok(Self {
                id_to_add: id.clone(),
            }),
            Some(other) => Err(Error::InvalidPayload(format!(
                "id: Expected string, received {}",
                json_kind(other)
            ))),
            None => Err(Error::InvalidPayload("id: Required".to_string())),
        }
    }
}

/// Body of `POST /api/message/send`. Field types are not checked here.
#[derive(Debug, Clone, Default)]
pub struct SendMessageInput {
    pub text: Option<Value>,
    pub chat_id: Option<Value>,
}

impl SendMessageInput {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if value.is_null() {
            return Err(Error::Internal(
                "Cannot destructure request body: null".to_string(),
            ));
        }
        Ok(Self {
            text: value.get("text").cloned(),
            chat_id: value.get("chatId").cloned(),
        })
    }

    pub fn chat_id(&self) -> Result<ChatId> {
        match &self.chat_id {
            Some(Value::String(raw)) => Ok(ChatId::new(raw.clone())),
            Some(other) => Err(Error::Internal(format!(
                "chatId must be a string, received {}",
                json_kind(other)
            ))),
            None => Err(Error::Internal("chatId is required".to_string())),
        }
    }
}
