//! The session store.
//!
//! Two asynchronous paths feed the state, with different contracts:
//!
//! - **Bootstrap** (`start`): the only owner of `is_loading`. If a session
//!   survives from a previous run, the profile/role fetch is awaited before
//!   `is_loading` flips to false, so the first settled render of a logged-in
//!   user never sees partial identity data.
//! - **Ongoing changes** (the subscription): user/session update
//!   immediately; the profile/role fetch is detached and guarded by a
//!   generation token, so a result that arrives after a later change, a
//!   sign-out or a shutdown is discarded instead of resurrecting stale
//!   state. The
//!   subscription never touches `is_loading`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use hims_auth::Role;
use hims_backend::{Backend, BackendError, NewUser, UserUpdate};
use hims_core::UserId;
use hims_events::AuthChange;

use crate::snapshot::SessionSnapshot;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub struct SessionStore {
    backend: Arc<dyn Backend>,
    /// Redirect target handed to the identity service on sign-up.
    origin: Option<String>,
    tx: watch::Sender<SessionSnapshot>,
    /// Bumped on every applied auth change, on sign-out and on shutdown;
    /// in-flight profile/role fetches compare against it before applying
    /// their result.
    generation: AtomicU64,
    live: AtomicBool,
    started: AtomicBool,
    shutdown: Arc<Notify>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn Backend>) -> Arc<Self> {
        Self::with_origin(backend, None)
    }

    /// `origin` is the application origin used as the sign-up redirect
    /// target.
    pub fn with_origin(backend: Arc<dyn Backend>, origin: Option<String>) -> Arc<Self> {
        let (tx, _rx) = watch::channel(SessionSnapshot::default());
        Arc::new(Self {
            backend,
            origin,
            tx,
            generation: AtomicU64::new(0),
            live: AtomicBool::new(true),
            started: AtomicBool::new(false),
            shutdown: Arc::new(Notify::new()),
            listener: Mutex::new(None),
        })
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    /// Watch for state changes (route guard re-evaluation, UI refresh).
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Bootstrap: called once at process start.
    ///
    /// Registers the ongoing-change listener first (changes landing during
    /// the bootstrap read are not lost), then restores any persisted
    /// session. `is_loading` flips to false only after the initial
    /// profile/role fetch settles, successfully or not.
    pub async fn start(self: Arc<Self>) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("session store started twice; ignoring");
            return;
        }

        let mut changes = self.backend.on_auth_state_change();
        let shutdown = Arc::clone(&self.shutdown);
        let weak = Arc::downgrade(&self);
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.notified() => break,
                    next = changes.next() => {
                        let Some(change) = next else { break };
                        let Some(store) = weak.upgrade() else { break };
                        store.apply_change(change);
                    }
                }
            }
            changes.dispose();
            tracing::debug!("auth change listener stopped");
        });
        if let Ok(mut slot) = self.listener.lock() {
            *slot = Some(handle);
        }

        match self.backend.get_session().await {
            Ok(session) => {
                if self.is_live() {
                    let user = session.as_ref().map(|s| s.user.clone());
                    self.tx.send_modify(|s| {
                        s.session = session;
                        s.user = user.clone();
                    });
                    if let Some(user) = user {
                        let generation = self.generation.load(Ordering::SeqCst);
                        self.fetch_user_data(user.id, generation).await;
                    }
                }
            }
            Err(err) => tracing::warn!(error = %err, "session bootstrap failed"),
        }

        if self.is_live() {
            self.tx.send_modify(|s| s.is_loading = false);
            tracing::info!(
                authenticated = self.tx.borrow().is_authenticated(),
                "session bootstrap complete"
            );
        }
    }

    /// Handle one pushed auth-state change.
    fn apply_change(self: Arc<Self>, change: AuthChange) {
        if !self.is_live() {
            return;
        }
        tracing::debug!(event = ?change.event, "auth state change");

        // Each applied change supersedes whatever identity fetch is still in
        // flight for the previous one, including a pushed sign-out from
        // another tab or a server-side expiry.
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match change.session {
            Some(session) => {
                let user = session.user.clone();
                self.tx.send_modify(|s| {
                    s.user = Some(user.clone());
                    s.session = Some(session);
                });

                // Detached fetch: the UI may briefly render with role=None,
                // which the route guard resolves as "checking permissions".
                let store = Arc::clone(&self);
                tokio::spawn(async move {
                    store.fetch_user_data(user.id, generation).await;
                });
            }
            None => {
                self.tx.send_modify(|s| {
                    s.user = None;
                    s.session = None;
                    s.profile = None;
                    s.role = None;
                });
            }
        }
    }

    /// Fetch profile and role for a user; errors degrade to "leave as-is".
    async fn fetch_user_data(&self, user_id: UserId, generation: u64) {
        let profile = match self.backend.find_profile_by_user(user_id).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "profile fetch failed");
                None
            }
        };
        let role = match self.backend.find_role(user_id).await {
            Ok(row) => row.map(|r| r.role),
            Err(err) => {
                tracing::warn!(%user_id, error = %err, "role fetch failed");
                None
            }
        };

        if !self.is_live() || self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(%user_id, "discarding stale identity fetch result");
            return;
        }

        self.tx.send_modify(move |s| {
            if let Some(profile) = profile {
                s.profile = Some(profile);
            }
            if let Some(role) = role {
                s.role = Some(role);
            }
        });
    }

    /// Create credentials and assign the chosen role to the new user.
    ///
    /// Local state is not touched; it updates through the change
    /// subscription once the user signs in.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> Result<(), SessionError> {
        let user = self
            .backend
            .sign_up(NewUser {
                email: email.to_string(),
                password: password.to_string(),
                redirect_to: self.origin.clone(),
                full_name: full_name.to_string(),
            })
            .await?;
        self.backend.insert_role(user.id, role).await?;
        tracing::info!(user_id = %user.id, %role, "account created");
        Ok(())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), SessionError> {
        self.backend.sign_in_with_password(email, password).await?;
        Ok(())
    }

    /// Sign out and clear local state immediately, without waiting for the
    /// subscription echo.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        let result = self.backend.sign_out().await;

        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_modify(|s| {
            s.user = None;
            s.session = None;
            s.profile = None;
            s.role = None;
        });

        result.map_err(Into::into)
    }

    pub async fn update_password(&self, new_password: &str) -> Result<(), SessionError> {
        self.backend
            .update_user(UserUpdate::password(new_password))
            .await?;
        Ok(())
    }

    /// Tear down: after this, no update is ever applied and the change
    /// subscription is disposed (exactly once, by the listener task).
    pub fn shutdown(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.shutdown.notify_one();
            tracing::debug!("session store shut down");
        }
    }
}

impl Drop for SessionStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
