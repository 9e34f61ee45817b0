//! Key and channel names shared with existing subscribers.
//!
//! These strings are part of the wire contract: clients subscribe to the same
//! channel names and other services read the same keys.

pub fn user(id: &str) -> String {
    format!("user:{}", id)
}

pub fn friends(id: &str) -> String {
    format!("user:{}:friends", id)
}

pub fn incoming_friend_requests(id: &str) -> String {
    format!("user:{}:incoming_friend_requests", id)
}

/// Personal channel carrying chat-list previews.
pub fn user_chats(id: &str) -> String {
    format!("user:{}:chats", id)
}

/// Channel for a single conversation.
pub fn chat(chat_id: &str) -> String {
    format!("chat:{}", chat_id)
}

/// Sorted set holding a conversation's messages, scored by timestamp.
pub fn chat_messages(chat_id: &str) -> String {
    format!("chat:{}:messages", chat_id)
}

pub fn session(token: &str) -> String {
    format!("user:session:{}", token)
}

/// Pusher rejects `:` in channel names.
pub fn to_pusher_key(key: &str) -> String {
    key.replace(':', "__")
}
