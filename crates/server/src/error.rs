//! Handler errors and their HTTP mapping.
//!
//! Every failure a handler can hit is one of five classes: authentication,
//! authorization, payload shape, state precondition, or internal. The status
//! code for a class depends on which endpoint produced it, so responses are
//! built from an `(Endpoint, Error)` pair rather than from the error alone.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Authentication
    #[error("Unauthorized")]
    Unauthenticated,

    // Authorization
    #[error("Unauthorized")]
    Forbidden,

    // Payload shape
    #[error("Invalid Request Payload: {0}")]
    InvalidPayload(String),

    // State preconditions
    #[error("Already Friends")]
    AlreadyFriends,
    #[error("No Friend Request")]
    NoFriendRequest,

    // Internal
    #[error("{0}")]
    Schema(String),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Store(String),
    #[error("{0}")]
    Publish(String),
    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

/// The five error classes handlers distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Authentication,
    Authorization,
    Payload,
    Precondition,
    Internal,
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Unauthenticated => ErrorClass::Authentication,
            Error::Forbidden => ErrorClass::Authorization,
            Error::InvalidPayload(_) => ErrorClass::Payload,
            Error::AlreadyFriends | Error::NoFriendRequest => ErrorClass::Precondition,
            Error::Schema(_)
            | Error::Json(_)
            | Error::Store(_)
            | Error::Publish(_)
            | Error::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Status and plain-text body for this error when raised by `endpoint`.
    pub fn status_for(&self, endpoint: Endpoint) -> (StatusCode, String) {
        match (endpoint, self.class()) {
            (_, ErrorClass::Authentication) | (_, ErrorClass::Authorization) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            (Endpoint::AcceptFriend, ErrorClass::Payload) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid Request Payload".to_string(),
            ),
            (Endpoint::AcceptFriend, ErrorClass::Precondition) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            (Endpoint::AcceptFriend, ErrorClass::Internal) => {
                (StatusCode::BAD_REQUEST, "Invalid request".to_string())
            }
            // The send endpoint folds everything else into a 500 carrying the message.
            (Endpoint::SendMessage, _) => {
                let message = self.to_string();
                let body = if message.is_empty() {
                    "Internal Server Error".to_string()
                } else {
                    message
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        }
    }

    /// Attach the endpoint so the error can be turned into a response.
    pub fn at(self, endpoint: Endpoint) -> ApiError {
        ApiError {
            endpoint,
            error: self,
        }
    }
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Store(err.to_string())
    }
}

/// Route that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    AcceptFriend,
    SendMessage,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::AcceptFriend => "/api/friends/accept",
            Endpoint::SendMessage => "/api/message/send",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub endpoint: Endpoint,
    pub error: Error,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.error.status_for(self.endpoint);
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(endpoint: Endpoint, error: Error) -> (u16, String) {
        let (status, body) = error.status_for(endpoint);
        (status.as_u16(), body)
    }

    #[test]
    fn accept_maps_each_class() {
        assert_eq!(
            status(Endpoint::AcceptFriend, Error::Unauthenticated),
            (401, "Unauthorized".into())
        );
        assert_eq!(
            status(Endpoint::AcceptFriend, Error::InvalidPayload("id".into())),
            (422, "Invalid Request Payload".into())
        );
        assert_eq!(
            status(Endpoint::AcceptFriend, Error::AlreadyFriends),
            (400, "Already Friends".into())
        );
        assert_eq!(
            status(Endpoint::AcceptFriend, Error::NoFriendRequest),
            (400, "No Friend Request".into())
        );
        assert_eq!(
            status(Endpoint::AcceptFriend, Error::Store("connection refused".into())),
            (400, "Invalid request".into())
        );
    }

    #[test]
    fn send_maps_internal_to_500_with_message() {
        assert_eq!(
            status(Endpoint::SendMessage, Error::Forbidden),
            (401, "Unauthorized".into())
        );
        assert_eq!(
            status(Endpoint::SendMessage, Error::Schema("text must be a string".into())),
            (500, "text must be a string".into())
        );
        assert_eq!(
            status(Endpoint::SendMessage, Error::Internal(String::new())),
            (500, "Internal Server Error".into())
        );
    }

    #[test]
    fn classes_are_distinct() {
        assert_eq!(Error::Unauthenticated.class(), ErrorClass::Authentication);
        assert_eq!(Error::Forbidden.class(), ErrorClass::Authorization);
        assert_eq!(Error::Publish("down".into()).class(), ErrorClass::Internal);
    }
}
