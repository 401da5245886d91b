//! Error types of the session conductor.

use poem::{error::ResponseError, http::StatusCode};

/// A possible error value when conducting a session.
#[derive(Debug, thiserror::Error)]
pub enum ConductorError {
    /// A key required by [`SessionConductor::ensure`](crate::SessionConductor::ensure)
    /// is missing from the session.
    #[error("session is missing key `{0}`")]
    MissingKey(String),

    /// No [`Session`](poem::session::Session) was attached to the request.
    #[error(
        "session not found, a session middleware such as `CookieSession` or `ServerSession` \
         is required around the `SessionConductor` middleware"
    )]
    SessionNotFound,
}

impl ResponseError for ConductorError {
    fn status(&self) -> StatusCode {
        match self {
            ConductorError::MissingKey(_) => StatusCode::BAD_REQUEST,
            ConductorError::SessionNotFound => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
