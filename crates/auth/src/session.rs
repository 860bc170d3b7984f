//! Session and principal types issued by the identity service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hims_core::UserId;

/// The authenticated principal behind a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
}

/// An authenticated connection to the identity service.
///
/// The token and expiry metadata are owned by the identity service and are
/// treated as opaque here; nothing in this workspace inspects or refreshes
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn user_id(&self) -> UserId {
        self.user.id
    }
}
