//! `hims-housing`: hostels, rooms, and room allocations.
//!
//! [`HostelService`] owns the hostel and room records; [`AllocationService`]
//! assigns students to rooms and enforces room capacity against active
//! allocations.

pub mod allocations;
pub mod hostels;

pub use allocations::{AllocationService, NewAllocationRequest};
pub use hostels::{HostelService, NewHostelRequest, NewRoomRequest, RoomOccupancy};

use thiserror::Error;

use hims_backend::BackendError;
use hims_core::DomainError;

#[derive(Debug, Error)]
pub enum HousingError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
