//! Friend request handlers

use axum::{body::Bytes, extract::State, http::HeaderMap};
use tracing::info;

use super::{load_user, reject, AppState};
use crate::error::{ApiError, Endpoint, Error, Result};
use crate::keys;
use crate::models::AcceptFriendInput;
use crate::realtime::{self, events};

/// POST /api/friends/accept
///
/// Body: `{"id": "<requester id>"}`. Makes the caller and the requester
/// friends and clears the pending request.
pub async fn accept_friend_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<&'static str, ApiError> {
    accept(&state, &headers, &body)
        .await
        .map_err(|e| reject(Endpoint::AcceptFriend, e))?;
    Ok("OK")
}

async fn accept(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    let input = AcceptFriendInput::parse(body)?;

    let session = state
        .sessions
        .resolve(headers)
        .await?
        .ok_or(Error::Unauthenticated)?;
    let caller = session.user_id();
    let id_to_add = input.id_to_add.as_str();

    let caller_friends = keys::friends(caller);
    let requester_friends = keys::friends(id_to_add);
    let caller_requests = keys::incoming_friend_requests(caller);

    if state.store.sismember(&caller_friends, id_to_add).await? {
        return Err(Error::AlreadyFriends);
    }

    if !state.store.sismember(&caller_requests, id_to_add).await? {
        return Err(Error::NoFriendRequest);
    }

    let store = state.store.as_ref();
    let (user, friend) = tokio::try_join!(load_user(store, caller), load_user(store, id_to_add))?;

    // Best-effort batch: the first failure fails the request, completed
    // operations stay applied.
    let publisher = state.publisher.as_ref();
    tokio::try_join!(
        realtime::trigger(publisher, &requester_friends, events::NEW_FRIEND, &user),
        realtime::trigger(publisher, &caller_friends, events::NEW_FRIEND, &friend),
        store.sadd(&caller_friends, id_to_add),
        store.sadd(&requester_friends, caller),
        store.srem(&caller_requests, id_to_add),
    )?;

    info!("[Friends] {} accepted friend request from {}", caller, id_to_add);
    Ok(())
}
