//! In-memory backend for tests/dev.
//!
//! Emulates the hosted service closely enough for the session store and the
//! page services: credential accounts, a persisted session slot, a profile
//! row auto-created on sign-up (the hosted schema does this with a trigger),
//! and cascade deletes from hostels to rooms/items/allocations.
//!
//! Not optimized for performance.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use hims_auth::{AuthUser, Role, Session};
use hims_core::{AllocationId, HostelId, ItemId, ProfileId, RoomId, UserId, UserRoleId};
use hims_events::{AuthBus, AuthChange, Subscription};

use crate::error::BackendError;
use crate::records::{
    Hostel, InventoryItem, NewAllocation, NewHostel, NewItem, NewProfile, NewRoom, Profile, Room,
    RoomAllocation, UserRole,
};
use crate::service::{
    AllocationStore, HostelStore, IdentityService, InventoryStore, NewUser, ProfileStore,
    RoomStore, UserRoleStore, UserUpdate,
};

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: String,
}

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    accounts: RwLock<HashMap<String, Account>>,
    session: RwLock<Option<Session>>,
    profiles: RwLock<HashMap<ProfileId, Profile>>,
    roles: RwLock<HashMap<UserRoleId, UserRole>>,
    hostels: RwLock<HashMap<HostelId, Hostel>>,
    rooms: RwLock<HashMap<RoomId, Room>>,
    items: RwLock<HashMap<ItemId, InventoryItem>>,
    allocations: RwLock<HashMap<AllocationId, RoomAllocation>>,
    bus: AuthBus,
    /// Test hook: make profile/role reads fail.
    fail_identity_reads: AtomicBool,
    /// Test hook: stall profile/role reads by this many milliseconds.
    identity_read_delay_ms: AtomicU64,
}

fn poisoned() -> BackendError {
    BackendError::Internal("lock poisoned".to_string())
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an auth change to subscribers, as the hosted service would on a
    /// token refresh or a sign-in from another tab.
    pub fn emit(&self, change: AuthChange) {
        self.bus.publish(change);
    }

    /// Seed a persisted session (the "valid token survives restart" case)
    /// without emitting a change.
    pub fn open_session(&self, user: AuthUser) -> Session {
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            user,
            expires_at: None,
        };
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session.clone());
        }
        session
    }

    /// Toggle failure of profile/role reads.
    pub fn fail_identity_reads(&self, fail: bool) {
        self.fail_identity_reads.store(fail, Ordering::SeqCst);
    }

    /// Stall profile/role reads, holding open the window between a pushed
    /// auth change and its detached identity fetch.
    pub fn delay_identity_reads(&self, delay: Duration) {
        self.identity_read_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    async fn check_identity_reads(&self) -> Result<(), BackendError> {
        let delay = self.identity_read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_identity_reads.load(Ordering::SeqCst) {
            return Err(BackendError::Network("simulated outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityService for InMemoryBackend {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(self.session.read().map_err(|_| poisoned())?.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), BackendError> {
        let account = {
            let accounts = self.accounts.read().map_err(|_| poisoned())?;
            accounts.get(email).cloned()
        };
        let Some(account) = account else {
            return Err(BackendError::InvalidCredentials);
        };
        if account.password != password {
            return Err(BackendError::InvalidCredentials);
        }

        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            user: account.user,
            expires_at: None,
        };
        *self.session.write().map_err(|_| poisoned())? = Some(session.clone());
        self.bus.publish(AuthChange::signed_in(session));
        Ok(())
    }

    async fn sign_up(&self, new_user: NewUser) -> Result<AuthUser, BackendError> {
        let user = {
            let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
            if accounts.contains_key(&new_user.email) {
                return Err(BackendError::EmailTaken);
            }
            let user = AuthUser {
                id: UserId::new(),
                email: new_user.email.clone(),
            };
            accounts.insert(
                new_user.email.clone(),
                Account {
                    user: user.clone(),
                    password: new_user.password.clone(),
                },
            );
            user
        };

        // The hosted schema creates the profile with a trigger on signup.
        let now = Utc::now();
        let profile = Profile {
            id: ProfileId::new(),
            user_id: Some(user.id),
            full_name: new_user.full_name,
            email: new_user.email,
            phone: None,
            student_id: None,
            hostel_id: None,
            room_number: None,
            gender: None,
            created_at: now,
            updated_at: now,
        };
        self.profiles
            .write()
            .map_err(|_| poisoned())?
            .insert(profile.id, profile);

        // Sign-up leaves the user confirmed-but-signed-out; no change is
        // emitted until the first sign-in.
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        *self.session.write().map_err(|_| poisoned())? = None;
        self.bus.publish(AuthChange::signed_out());
        Ok(())
    }

    async fn update_user(&self, update: UserUpdate) -> Result<(), BackendError> {
        let session = self
            .session
            .read()
            .map_err(|_| poisoned())?
            .clone()
            .ok_or(BackendError::NotAuthenticated)?;

        if let Some(password) = update.password {
            let mut accounts = self.accounts.write().map_err(|_| poisoned())?;
            let account = accounts
                .get_mut(&session.user.email)
                .ok_or(BackendError::NotAuthenticated)?;
            account.password = password;
        }
        Ok(())
    }

    fn on_auth_state_change(&self) -> Subscription {
        self.bus.subscribe()
    }
}

#[async_trait]
impl ProfileStore for InMemoryBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        Ok(self
            .profiles
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn find_profile_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Profile>, BackendError> {
        self.check_identity_reads().await?;
        Ok(self
            .profiles
            .read()
            .map_err(|_| poisoned())?
            .values()
            .find(|p| p.user_id == Some(user_id))
            .cloned())
    }

    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, BackendError> {
        let now = Utc::now();
        let profile = Profile {
            id: ProfileId::new(),
            user_id: new.user_id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            student_id: new.student_id,
            hostel_id: new.hostel_id,
            room_number: new.room_number,
            gender: new.gender,
            created_at: now,
            updated_at: now,
        };
        self.profiles
            .write()
            .map_err(|_| poisoned())?
            .insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, profile: &Profile) -> Result<(), BackendError> {
        let mut profiles = self.profiles.write().map_err(|_| poisoned())?;
        let Some(existing) = profiles.get_mut(&profile.id) else {
            return Err(BackendError::Api {
                status: 404,
                message: "profile not found".to_string(),
            });
        };
        *existing = Profile {
            updated_at: Utc::now(),
            ..profile.clone()
        };
        Ok(())
    }

    async fn delete_profile_by_user(&self, user_id: UserId) -> Result<(), BackendError> {
        self.profiles
            .write()
            .map_err(|_| poisoned())?
            .retain(|_, p| p.user_id != Some(user_id));
        Ok(())
    }
}

#[async_trait]
impl UserRoleStore for InMemoryBackend {
    async fn list_roles(&self) -> Result<Vec<UserRole>, BackendError> {
        Ok(self
            .roles
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn find_role(&self, user_id: UserId) -> Result<Option<UserRole>, BackendError> {
        self.check_identity_reads().await?;
        Ok(self
            .roles
            .read()
            .map_err(|_| poisoned())?
            .values()
            .find(|r| r.user_id == user_id)
            .cloned())
    }

    async fn insert_role(&self, user_id: UserId, role: Role) -> Result<UserRole, BackendError> {
        let row = UserRole {
            id: UserRoleId::new(),
            user_id,
            role,
            created_at: Utc::now(),
        };
        self.roles
            .write()
            .map_err(|_| poisoned())?
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> Result<(), BackendError> {
        let mut roles = self.roles.write().map_err(|_| poisoned())?;
        for row in roles.values_mut() {
            if row.user_id == user_id {
                row.role = role;
            }
        }
        Ok(())
    }

    async fn delete_role(&self, user_id: UserId) -> Result<(), BackendError> {
        self.roles
            .write()
            .map_err(|_| poisoned())?
            .retain(|_, r| r.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl HostelStore for InMemoryBackend {
    async fn list_hostels(&self) -> Result<Vec<Hostel>, BackendError> {
        Ok(self
            .hostels
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn insert_hostel(&self, new: NewHostel) -> Result<Hostel, BackendError> {
        let now = Utc::now();
        let hostel = Hostel {
            id: HostelId::new(),
            name: new.name,
            location: new.location,
            capacity: new.capacity,
            warden_id: new.warden_id,
            created_at: now,
            updated_at: now,
        };
        self.hostels
            .write()
            .map_err(|_| poisoned())?
            .insert(hostel.id, hostel.clone());
        Ok(hostel)
    }

    async fn delete_hostel(&self, id: HostelId) -> Result<(), BackendError> {
        self.hostels.write().map_err(|_| poisoned())?.remove(&id);

        // Cascade, as the hosted schema's foreign keys do.
        let removed_rooms: Vec<RoomId> = {
            let mut rooms = self.rooms.write().map_err(|_| poisoned())?;
            let doomed: Vec<RoomId> = rooms
                .values()
                .filter(|r| r.hostel_id == id)
                .map(|r| r.id)
                .collect();
            rooms.retain(|_, r| r.hostel_id != id);
            doomed
        };
        self.items
            .write()
            .map_err(|_| poisoned())?
            .retain(|_, i| i.hostel_id != id);
        self.allocations
            .write()
            .map_err(|_| poisoned())?
            .retain(|_, a| !removed_rooms.contains(&a.room_id));
        Ok(())
    }
}

#[async_trait]
impl RoomStore for InMemoryBackend {
    async fn list_rooms(&self) -> Result<Vec<Room>, BackendError> {
        Ok(self
            .rooms
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn insert_room(&self, new: NewRoom) -> Result<Room, BackendError> {
        let now = Utc::now();
        let room = Room {
            id: RoomId::new(),
            hostel_id: new.hostel_id,
            room_number: new.room_number,
            capacity: new.capacity,
            floor: new.floor,
            created_at: now,
            updated_at: now,
        };
        self.rooms
            .write()
            .map_err(|_| poisoned())?
            .insert(room.id, room.clone());
        Ok(room)
    }
}

#[async_trait]
impl InventoryStore for InMemoryBackend {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, BackendError> {
        Ok(self
            .items
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn insert_item(&self, new: NewItem) -> Result<InventoryItem, BackendError> {
        let now = Utc::now();
        let item = InventoryItem {
            id: ItemId::new(),
            hostel_id: new.hostel_id,
            item_name: new.item_name,
            category: new.category,
            quantity: new.quantity,
            unit: new.unit,
            min_stock_level: new.min_stock_level,
            notes: new.notes,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };
        self.items
            .write()
            .map_err(|_| poisoned())?
            .insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(&self, item: &InventoryItem) -> Result<(), BackendError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        let Some(existing) = items.get_mut(&item.id) else {
            return Err(BackendError::Api {
                status: 404,
                message: "item not found".to_string(),
            });
        };
        *existing = InventoryItem {
            updated_at: Utc::now(),
            ..item.clone()
        };
        Ok(())
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), BackendError> {
        self.items.write().map_err(|_| poisoned())?.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AllocationStore for InMemoryBackend {
    async fn list_allocations(&self) -> Result<Vec<RoomAllocation>, BackendError> {
        Ok(self
            .allocations
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect())
    }

    async fn insert_allocation(
        &self,
        new: NewAllocation,
    ) -> Result<RoomAllocation, BackendError> {
        let now = Utc::now();
        let allocation = RoomAllocation {
            id: AllocationId::new(),
            room_id: new.room_id,
            student_id: new.student_id,
            allocated_by: new.allocated_by,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        self.allocations
            .write()
            .map_err(|_| poisoned())?
            .insert(allocation.id, allocation.clone());
        Ok(allocation)
    }

    async fn set_allocation_active(
        &self,
        id: AllocationId,
        is_active: bool,
    ) -> Result<(), BackendError> {
        let mut allocations = self.allocations.write().map_err(|_| poisoned())?;
        if let Some(allocation) = allocations.get_mut(&id) {
            allocation.is_active = is_active;
            allocation.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_allocation(&self, id: AllocationId) -> Result<(), BackendError> {
        self.allocations.write().map_err(|_| poisoned())?.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_up_creates_account_and_profile_without_session() {
        let backend = InMemoryBackend::new();
        let user = backend
            .sign_up(NewUser {
                email: "warden@hostel.test".to_string(),
                password: "secret123".to_string(),
                redirect_to: None,
                full_name: "Ada Warden".to_string(),
            })
            .await
            .unwrap();

        assert!(backend.get_session().await.unwrap().is_none());
        let profile = backend.find_profile_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Ada Warden");
        assert_eq!(profile.user_id, Some(user.id));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let backend = InMemoryBackend::new();
        let new = |pw: &str| NewUser {
            email: "dup@hostel.test".to_string(),
            password: pw.to_string(),
            redirect_to: None,
            full_name: "Dup".to_string(),
        };
        backend.sign_up(new("one")).await.unwrap();
        assert!(matches!(
            backend.sign_up(new("two")).await,
            Err(BackendError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn sign_in_emits_change_and_persists_session() {
        let backend = InMemoryBackend::new();
        backend
            .sign_up(NewUser {
                email: "s@hostel.test".to_string(),
                password: "pw".to_string(),
                redirect_to: None,
                full_name: "S".to_string(),
            })
            .await
            .unwrap();

        let mut sub = backend.on_auth_state_change();
        backend
            .sign_in_with_password("s@hostel.test", "pw")
            .await
            .unwrap();

        let change = sub.next().await.unwrap();
        assert!(change.session.is_some());
        assert!(backend.get_session().await.unwrap().is_some());

        assert!(matches!(
            backend.sign_in_with_password("s@hostel.test", "wrong").await,
            Err(BackendError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn deleting_a_hostel_cascades() {
        let backend = InMemoryBackend::new();
        let hostel = backend
            .insert_hostel(NewHostel {
                name: "North Wing".to_string(),
                location: None,
                capacity: 40,
                warden_id: None,
            })
            .await
            .unwrap();
        let room = backend
            .insert_room(NewRoom {
                hostel_id: hostel.id,
                room_number: "A1".to_string(),
                capacity: 2,
                floor: Some(1),
            })
            .await
            .unwrap();
        backend
            .insert_item(NewItem {
                hostel_id: hostel.id,
                item_name: "Desk".to_string(),
                category: crate::records::InventoryCategory::Furniture,
                quantity: 4,
                unit: None,
                min_stock_level: None,
                notes: None,
                created_by: None,
            })
            .await
            .unwrap();
        backend
            .insert_allocation(NewAllocation {
                room_id: room.id,
                student_id: UserId::new(),
                allocated_by: None,
                start_date: chrono::Utc::now().date_naive(),
                end_date: None,
                is_active: true,
            })
            .await
            .unwrap();

        backend.delete_hostel(hostel.id).await.unwrap();

        assert!(backend.list_rooms().await.unwrap().is_empty());
        assert!(backend.list_items().await.unwrap().is_empty());
        assert!(backend.list_allocations().await.unwrap().is_empty());
    }
}
