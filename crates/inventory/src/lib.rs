//! `hims-inventory`: stock kept per hostel.

pub mod items;

pub use items::{InventoryService, ItemUpdate, NewItemRequest};

use thiserror::Error;

use hims_backend::BackendError;
use hims_core::DomainError;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
