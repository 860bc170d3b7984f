use thiserror::Error;

/// Error surface of the Identity & Data service.
///
/// Credential operations return these to the caller; background profile/role
/// fetches log and swallow them (state degrades to `None` instead of
/// blocking rendering).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("service error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response parse error: {0}")]
    Parse(String),

    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("internal error: {0}")]
    Internal(String),
}

impl BackendError {
    pub fn network(err: impl core::fmt::Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn parse(err: impl core::fmt::Display) -> Self {
        Self::Parse(err.to_string())
    }
}
