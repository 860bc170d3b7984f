//! `hims-backend`: the Identity & Data service boundary.
//!
//! The managed backend (authentication, persistence, row-level authorization)
//! is an external collaborator. This crate pins down exactly the surface the
//! rest of the workspace consumes:
//!
//! - [`IdentityService`]: session retrieval, credential operations, and the
//!   auth-state change subscription
//! - one typed store trait per logical table (`profiles`, `user_roles`,
//!   `hostels`, `rooms`, `inventory`, `room_allocations`)
//! - [`Backend`]: the umbrella supertrait the application wires against
//!
//! Two implementations ship here: [`InMemoryBackend`] for tests/dev and
//! [`RestBackend`] for a hosted, Supabase-compatible REST surface.

pub mod error;
pub mod memory;
pub mod records;
pub mod rest;
pub mod service;

pub use error::BackendError;
pub use memory::InMemoryBackend;
pub use records::{
    Gender, Hostel, InventoryCategory, InventoryItem, NewAllocation, NewHostel, NewItem,
    NewProfile, NewRoom, Profile, Room, RoomAllocation, UserRole,
};
pub use rest::RestBackend;
pub use service::{
    AllocationStore, Backend, HostelStore, IdentityService, InventoryStore, NewUser, ProfileStore,
    RoomStore, UserRoleStore, UserUpdate,
};
