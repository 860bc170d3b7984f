//! `hims-core`: shared foundation for the hostel management system.
//!
//! This crate contains **pure domain** primitives (no IO, no service calls):
//! strongly-typed identifiers and the domain error model.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{AllocationId, HostelId, ItemId, ProfileId, RoomId, UserId, UserRoleId};
