//! `hims-events`: auth-state change notifications.
//!
//! The identity service pushes a notification on every login, logout, and
//! token refresh for the lifetime of the process. This crate provides the
//! event types and a small broadcast bus whose subscriptions carry an
//! explicit disposer (unsubscription happens exactly once, no matter how
//! often `dispose` is called or whether the subscription is simply dropped).

pub mod bus;
pub mod change;

pub use bus::{AuthBus, Subscription};
pub use change::{AuthChange, AuthEvent};
