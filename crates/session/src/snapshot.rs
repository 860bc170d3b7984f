use hims_auth::{AuthUser, Role, Session, SessionView};
use hims_backend::Profile;

/// Immutable view of the session store's state.
///
/// Invariants (maintained by the store, relied upon by consumers):
/// - `is_loading` is true only during bootstrap and never flips back
/// - `profile`/`role` are populated only while `user` is populated
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    pub session: Option<Session>,
    pub profile: Option<Profile>,
    pub role: Option<Role>,
    pub is_loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            session: None,
            profile: None,
            role: None,
            is_loading: true,
        }
    }
}

impl SessionSnapshot {
    /// The reduced view the route guard evaluates.
    pub fn view(&self) -> SessionView {
        SessionView {
            user: self.user.as_ref().map(|u| u.id),
            role: self.role,
            is_loading: self.is_loading,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
