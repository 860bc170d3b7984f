//! `hims-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from the identity service and from
//! any view layer: the role set, the session/user types, and the route guard
//! are plain data and pure functions. The session store (`hims-session`)
//! produces `SessionView` values; navigation consumes `RouteOutcome`s.

pub mod guard;
pub mod roles;
pub mod session;

pub use guard::{RouteOutcome, SessionView, evaluate};
pub use roles::Role;
pub use session::{AuthUser, Session};
