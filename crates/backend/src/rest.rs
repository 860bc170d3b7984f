//! REST implementation of the backend contracts.
//!
//! Talks to a hosted, Supabase-compatible surface: `/auth/v1/*` for
//! credentials and `/rest/v1/<table>` for rows. Auth-state changes are
//! emitted client-side after credential operations succeed, matching the
//! hosted SDK's behavior. Token persistence across processes is left to the
//! embedding application ([`RestBackend::restore_session`]).

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use hims_auth::{AuthUser, Role, Session};
use hims_core::{AllocationId, HostelId, ItemId, UserId};
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

pub struct RestBackend {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    bus: AuthBus,
}

#[derive(Debug, Deserialize)]
struct RestUser {
    id: UserId,
    email: String,
}

impl From<RestUser> for AuthUser {
    fn from(user: RestUser) -> Self {
        AuthUser {
            id: user.id,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_at: Option<i64>,
    user: RestUser,
}

/// Sign-up replies differ by confirmation mode: with email confirmation on,
/// the user object comes back top-level; with autoconfirm, nested in a
/// session payload.
#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(default)]
    id: Option<UserId>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user: Option<RestUser>,
}

fn eq(value: impl core::fmt::Display) -> String {
    format!("eq.{value}")
}

fn poisoned() -> BackendError {
    BackendError::Internal("session lock poisoned".to_string())
}

impl RestBackend {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            session: RwLock::new(None),
            bus: AuthBus::new(),
        }
    }

    /// Seed a previously persisted session before calling the session
    /// store's bootstrap.
    pub fn restore_session(&self, session: Session) {
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session);
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn bearer(&self) -> String {
        self.session
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|s| s.access_token.clone()))
            .unwrap_or_else(|| self.anon_key.clone())
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(BackendError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend_from_slice(filters);
        let resp = self
            .http
            .get(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(&query)
            .send()
            .await
            .map_err(BackendError::network)?;
        Self::check(resp)
            .await?
            .json()
            .await
            .map_err(BackendError::parse)
    }

    async fn insert<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let resp = self
            .http
            .post(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(BackendError::network)?;
        let rows: Vec<T> = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(BackendError::parse)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Parse("empty insert response".to_string()))
    }

    async fn patch<B>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> Result<(), BackendError>
    where
        B: serde::Serialize + ?Sized,
    {
        let resp = self
            .http
            .patch(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(filters)
            .json(body)
            .send()
            .await
            .map_err(BackendError::network)?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<(), BackendError> {
        let resp = self
            .http
            .delete(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(self.bearer())
            .query(filters)
            .send()
            .await
            .map_err(BackendError::network)?;
        Self::check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityService for RestBackend {
    async fn get_session(&self) -> Result<Option<Session>, BackendError> {
        Ok(self.session.read().map_err(|_| poisoned())?.clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(), BackendError> {
        let resp = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(BackendError::network)?;

        if resp.status().as_u16() == 400 {
            return Err(BackendError::InvalidCredentials);
        }
        let tokens: TokenResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(BackendError::parse)?;

        let session = Session {
            access_token: tokens.access_token,
            user: tokens.user.into(),
            expires_at: tokens
                .expires_at
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
        };
        *self.session.write().map_err(|_| poisoned())? = Some(session.clone());
        self.bus.publish(AuthChange::signed_in(session));
        Ok(())
    }

    async fn sign_up(&self, new_user: NewUser) -> Result<AuthUser, BackendError> {
        let mut req = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key);
        if let Some(redirect_to) = &new_user.redirect_to {
            req = req.query(&[("redirect_to", redirect_to.as_str())]);
        }
        let resp = req
            .json(&json!({
                "email": new_user.email,
                "password": new_user.password,
                "data": { "full_name": new_user.full_name },
            }))
            .send()
            .await
            .map_err(BackendError::network)?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            if status.as_u16() == 422 || message.contains("already registered") {
                return Err(BackendError::EmailTaken);
            }
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: SignUpResponse = resp.json().await.map_err(BackendError::parse)?;
        let user = match (reply.user, reply.id, reply.email) {
            (Some(user), _, _) => user.into(),
            (None, Some(id), Some(email)) => AuthUser { id, email },
            _ => return Err(BackendError::Parse("sign-up reply without user".to_string())),
        };
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let token = {
            let slot = self.session.read().map_err(|_| poisoned())?;
            slot.as_ref().map(|s| s.access_token.clone())
        };

        let result = if let Some(token) = token {
            let resp = self
                .http
                .post(self.auth_url("logout"))
                .header("apikey", &self.anon_key)
                .bearer_auth(token)
                .send()
                .await;
            match resp {
                Ok(resp) => Self::check(resp).await.map(|_| ()),
                Err(err) => Err(BackendError::network(err)),
            }
        } else {
            Ok(())
        };

        // Local sign-out happens regardless of the remote outcome; a stale
        // server-side token must not keep the client logged in.
        *self.session.write().map_err(|_| poisoned())? = None;
        self.bus.publish(AuthChange::signed_out());
        result
    }

    async fn update_user(&self, update: UserUpdate) -> Result<(), BackendError> {
        let token = {
            let slot = self.session.read().map_err(|_| poisoned())?;
            slot.as_ref()
                .map(|s| s.access_token.clone())
                .ok_or(BackendError::NotAuthenticated)?
        };
        let resp = self
            .http
            .put(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .json(&update)
            .send()
            .await
            .map_err(BackendError::network)?;
        Self::check(resp).await?;
        Ok(())
    }

    fn on_auth_state_change(&self) -> Subscription {
        self.bus.subscribe()
    }
}

#[async_trait]
impl ProfileStore for RestBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        self.select("profiles", &[]).await
    }

    async fn find_profile_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Profile>, BackendError> {
        let rows: Vec<Profile> = self
            .select("profiles", &[("user_id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, new: NewProfile) -> Result<Profile, BackendError> {
        self.insert("profiles", &new).await
    }

    async fn update_profile(&self, profile: &Profile) -> Result<(), BackendError> {
        self.patch(
            "profiles",
            &[("id", eq(profile.id))],
            &json!({
                "full_name": profile.full_name,
                "email": profile.email,
                "phone": profile.phone,
                "student_id": profile.student_id,
                "hostel_id": profile.hostel_id,
                "room_number": profile.room_number,
                "gender": profile.gender,
            }),
        )
        .await
    }

    async fn delete_profile_by_user(&self, user_id: UserId) -> Result<(), BackendError> {
        self.delete("profiles", &[("user_id", eq(user_id))]).await
    }
}

#[async_trait]
impl UserRoleStore for RestBackend {
    async fn list_roles(&self) -> Result<Vec<UserRole>, BackendError> {
        self.select("user_roles", &[]).await
    }

    async fn find_role(&self, user_id: UserId) -> Result<Option<UserRole>, BackendError> {
        let rows: Vec<UserRole> = self
            .select("user_roles", &[("user_id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_role(&self, user_id: UserId, role: Role) -> Result<UserRole, BackendError> {
        self.insert("user_roles", &json!({ "user_id": user_id, "role": role }))
            .await
    }

    async fn update_role(&self, user_id: UserId, role: Role) -> Result<(), BackendError> {
        self.patch(
            "user_roles",
            &[("user_id", eq(user_id))],
            &json!({ "role": role }),
        )
        .await
    }

    async fn delete_role(&self, user_id: UserId) -> Result<(), BackendError> {
        self.delete("user_roles", &[("user_id", eq(user_id))]).await
    }
}

#[async_trait]
impl HostelStore for RestBackend {
    async fn list_hostels(&self) -> Result<Vec<Hostel>, BackendError> {
        self.select("hostels", &[]).await
    }

    async fn insert_hostel(&self, new: NewHostel) -> Result<Hostel, BackendError> {
        self.insert("hostels", &new).await
    }

    async fn delete_hostel(&self, id: HostelId) -> Result<(), BackendError> {
        self.delete("hostels", &[("id", eq(id))]).await
    }
}

#[async_trait]
impl RoomStore for RestBackend {
    async fn list_rooms(&self) -> Result<Vec<Room>, BackendError> {
        self.select("rooms", &[]).await
    }

    async fn insert_room(&self, new: NewRoom) -> Result<Room, BackendError> {
        self.insert("rooms", &new).await
    }
}

#[async_trait]
impl InventoryStore for RestBackend {
    async fn list_items(&self) -> Result<Vec<InventoryItem>, BackendError> {
        self.select("inventory", &[]).await
    }

    async fn insert_item(&self, new: NewItem) -> Result<InventoryItem, BackendError> {
        self.insert("inventory", &new).await
    }

    async fn update_item(&self, item: &InventoryItem) -> Result<(), BackendError> {
        self.patch(
            "inventory",
            &[("id", eq(item.id))],
            &json!({
                "item_name": item.item_name,
                "category": item.category,
                "quantity": item.quantity,
                "unit": item.unit,
                "min_stock_level": item.min_stock_level,
                "notes": item.notes,
            }),
        )
        .await
    }

    async fn delete_item(&self, id: ItemId) -> Result<(), BackendError> {
        self.delete("inventory", &[("id", eq(id))]).await
    }
}

#[async_trait]
impl AllocationStore for RestBackend {
    async fn list_allocations(&self) -> Result<Vec<RoomAllocation>, BackendError> {
        self.select("room_allocations", &[]).await
    }

    async fn insert_allocation(
        &self,
        new: NewAllocation,
    ) -> Result<RoomAllocation, BackendError> {
        self.insert("room_allocations", &new).await
    }

    async fn set_allocation_active(
        &self,
        id: AllocationId,
        is_active: bool,
    ) -> Result<(), BackendError> {
        self.patch(
            "room_allocations",
            &[("id", eq(id))],
            &json!({ "is_active": is_active }),
        )
        .await
    }

    async fn delete_allocation(&self, id: AllocationId) -> Result<(), BackendError> {
        self.delete("room_allocations", &[("id", eq(id))]).await
    }
}
