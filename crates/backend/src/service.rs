//! Service contracts consumed by the rest of the workspace.
//!
//! The session store talks to [`IdentityService`] plus the profile/role
//! stores; the page-level services talk to the table stores. Single-row
//! lookups return `Ok(None)` when no row matches (the "maybe single"
//! contract); absence is not an error.

use async_trait::async_trait;
use serde::Serialize;

use hims_auth::{AuthUser, Role, Session};
use hims_core::{AllocationId, HostelId, ItemId, UserId};
use hims_events::Subscription;

use crate::error::BackendError;
use crate::records::{
    Hostel, InventoryItem, NewAllocation, NewHostel, NewItem, NewProfile, NewRoom, Profile, Room,
    RoomAllocation, UserRole,
};

/// Sign-up request: credentials plus signup metadata.
///
/// `redirect_to` is the application origin the confirmation link should
/// return to; `full_name` is stored as signup metadata and seeds the profile
/// the service creates for the new user.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    pub full_name: String,
}

/// Mutation of the currently authenticated user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn password(new_password: impl Into<String>) -> Self {
        Self {
            password: Some(new_password.into()),
        }
    }
}

/// Authentication operations of the identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Retrieve the existing session, if a valid one persists.
    async fn get_session(&self) -> Result<Option<Session>, BackendError>;

    /// Password sign-in. State updates arrive via the change subscription,
    /// not through the return value.
    async fn sign_in_with_password(&self, email: &str, password: &str)
    -> Result<(), BackendError>;

    /// Create credentials; returns the new user without signing it in.
    async fn sign_up(&self, new_user: NewUser) -> Result<AuthUser, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    async fn update_user(&self, update: UserUpdate) -> Result<(), BackendError>;

    /// Register for login/logout/refresh pushes. The returned subscription
    /// is the disposer; it lives for the rest of the process unless
    /// explicitly disposed.
    fn on_auth_state_change(&self) -> Subscription;
}

/// `profiles` table.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError>;
    async fn find_profile_by_user(&self, user_id: UserId)
    -> Result<Option<Profile>, BackendError>;
    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, BackendError>;
    async fn update_profile(&self, profile: &Profile) -> Result<(), BackendError>;
    async fn delete_profile_by_user(&self, user_id: UserId) -> Result<(), BackendError>;
}

/// `user_roles` table.
#[async_trait]
pub trait UserRoleStore: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<UserRole>, BackendError>;
    async fn find_role(&self, user_id: UserId) -> Result<Option<UserRole>, BackendError>;
    async fn insert_role(&self, user_id: UserId, role: Role) -> Result<UserRole, BackendError>;
    async fn update_role(&self, user_id: UserId, role: Role) -> Result<(), BackendError>;
    async fn delete_role(&self, user_id: UserId) -> Result<(), BackendError>;
}

/// `hostels` table.
#[async_trait]
pub trait HostelStore: Send + Sync {
    async fn list_hostels(&self) -> Result<Vec<Hostel>, BackendError>;
    async fn insert_hostel(&self, new: NewHostel) -> Result<Hostel, BackendError>;
    async fn delete_hostel(&self, id: HostelId) -> Result<(), BackendError>;
}

/// `rooms` table.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<Room>, BackendError>;
    async fn insert_room(&self, new: NewRoom) -> Result<Room, BackendError>;
}

/// `inventory` table.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, BackendError>;
    async fn insert_item(&self, new: NewItem) -> Result<InventoryItem, BackendError>;
    async fn update_item(&self, item: &InventoryItem) -> Result<(), BackendError>;
    async fn delete_item(&self, id: ItemId) -> Result<(), BackendError>;
}

/// `room_allocations` table.
#[async_trait]
pub trait AllocationStore: Send + Sync {
    async fn list_allocations(&self) -> Result<Vec<RoomAllocation>, BackendError>;
    async fn insert_allocation(&self, new: NewAllocation)
    -> Result<RoomAllocation, BackendError>;
    async fn set_allocation_active(
        &self,
        id: AllocationId,
        is_active: bool,
    ) -> Result<(), BackendError>;
    async fn delete_allocation(&self, id: AllocationId) -> Result<(), BackendError>;
}

/// Everything the application wires against, as one object-safe trait.
pub trait Backend:
    IdentityService
    + ProfileStore
    + UserRoleStore
    + HostelStore
    + RoomStore
    + InventoryStore
    + AllocationStore
{
}

impl<T> Backend for T where
    T: IdentityService
        + ProfileStore
        + UserRoleStore
        + HostelStore
        + RoomStore
        + InventoryStore
        + AllocationStore
{
}
