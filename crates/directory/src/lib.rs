//! `hims-directory`: people management.
//!
//! Two services over the data boundary: the [`StudentDirectory`] keeps the
//! student records (login-less profiles carrying a student identifier), and
//! [`AccountAdmin`] manages staff login accounts and their role
//! assignments. Both validate input up front and otherwise defer to the
//! backend's row semantics.

pub mod accounts;
pub mod students;

mod validate;

pub use accounts::{Account, AccountAdmin, NewAccount};
pub use students::{HostelOption, NewStudent, StudentDirectory, StudentUpdate};

use thiserror::Error;

use hims_backend::BackendError;
use hims_core::DomainError;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
