//! Shared application state: the backend, the session store, and the page
//! services built over them.

use std::sync::Arc;

use hims_backend::{Backend, InMemoryBackend, RestBackend};
use hims_directory::{AccountAdmin, StudentDirectory};
use hims_housing::{AllocationService, HostelService};
use hims_inventory::InventoryService;
use hims_reports::ReportService;
use hims_session::SessionStore;

use crate::Config;

pub struct AppState {
    backend: Arc<dyn Backend>,
    session: Arc<SessionStore>,
    origin: Option<String>,
}

impl AppState {
    /// Wire against the hosted backend.
    pub fn new(config: &Config) -> Self {
        let backend: Arc<dyn Backend> =
            Arc::new(RestBackend::new(&config.api_url, &config.anon_key));
        let session = SessionStore::with_origin(backend.clone(), config.origin.clone());
        Self {
            backend,
            session,
            origin: config.origin.clone(),
        }
    }

    /// Wire against the in-memory backend (tests, demos).
    pub fn in_memory() -> Self {
        let backend: Arc<dyn Backend> = Arc::new(InMemoryBackend::new());
        let session = SessionStore::new(backend.clone());
        Self {
            backend,
            session,
            origin: None,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn students(&self) -> StudentDirectory {
        StudentDirectory::new(self.backend.clone())
    }

    pub fn accounts(&self) -> AccountAdmin {
        AccountAdmin::with_origin(self.backend.clone(), self.origin.clone())
    }

    pub fn hostels(&self) -> HostelService {
        HostelService::new(self.backend.clone())
    }

    pub fn allocations(&self) -> AllocationService {
        AllocationService::new(self.backend.clone())
    }

    pub fn inventory(&self) -> InventoryService {
        InventoryService::new(self.backend.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.backend.clone())
    }
}
