//! `hims-session`: process-wide authentication state.
//!
//! The [`SessionStore`] is the single source of truth for "who is logged in,
//! with what role". It bootstraps from the identity service once, then keeps
//! itself current from the auth-state change subscription for the rest of
//! the process. Consumers read immutable [`SessionSnapshot`]s or watch for
//! changes; the route guard in `hims-auth` consumes the derived
//! `SessionView`.

pub mod snapshot;
pub mod store;

pub use snapshot::SessionSnapshot;
pub use store::{SessionError, SessionStore};
