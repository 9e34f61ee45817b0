//! Chat message handlers

use axum::{body::Bytes, extract::State, http::HeaderMap};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{load_user, reject, AppState};
use crate::error::{ApiError, Endpoint, Error, Result};
use crate::keys;
use crate::models::{Message, MessageDraft, NewMessageNotification, SendMessageInput};
use crate::realtime::{self, events};

/// POST /api/message/send
///
/// Body: `{"text": "...", "chatId": "<a>--<b>"}`. The caller must be one of
/// the two participants and a friend of the other.
pub async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<&'static str, ApiError> {
    send(&state, &headers, &body)
        .await
        .map_err(|e| reject(Endpoint::SendMessage, e))?;
    Ok("OK")
}

async fn send(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<Message> {
    let input = SendMessageInput::parse(body)?;

    let session = state
        .sessions
        .resolve(headers)
        .await?
        .ok_or(Error::Unauthenticated)?;
    let caller = session.user_id();

    let chat_id = input.chat_id()?;
    let friend_id = chat_id.counterpart(caller)?;

    let friend_list = state.store.smembers(&keys::friends(caller)).await?;
    if !friend_list.iter().any(|id| id == friend_id) {
        return Err(Error::Forbidden);
    }

    let sender = load_user(state.store.as_ref(), caller).await?;

    let message = MessageDraft {
        id: Uuid::new_v4().to_string(),
        sender_id: caller.to_string(),
        reciver_id: friend_id.to_string(),
        text: input.text,
        timestamp: Utc::now().timestamp_millis(),
    }
    .validate()?;

    let chat_channel = keys::chat(chat_id.as_str());
    let chats_channel = keys::user_chats(friend_id);
    let preview = NewMessageNotification {
        message: message.clone(),
        sender_img: sender.image,
        sender_name: sender.name,
    };

    let publisher = state.publisher.as_ref();
    tokio::try_join!(
        realtime::trigger(publisher, &chat_channel, events::INCOMING_MESSAGE, &message),
        realtime::trigger(publisher, &chats_channel, events::NEW_MESSAGE, &preview),
    )?;

    let member = serde_json::to_string(&message)?;
    state
        .store
        .zadd(&keys::chat_messages(chat_id.as_str()), message.timestamp, &member)
        .await?;

    info!("[Messages] {} -> {} in {}", caller, friend_id, chat_id);
    Ok(message)
}
