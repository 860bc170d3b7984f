//! `hims-reports`: aggregation over the raw rows.
//!
//! All computation happens client-side over fetched rows: the pure
//! functions in [`aggregate`] fold row slices into summaries, and
//! [`ReportService`] is the thin fetch-then-fold layer including the
//! downloadable [`FullReport`].

pub mod aggregate;
pub mod service;

pub use aggregate::{
    CategorySummary, HostelOccupancy, InventorySummary, WardenStats, inventory_summary,
    occupancy_by_hostel, warden_performance,
};
pub use service::{FullReport, ReportService};

use thiserror::Error;

use hims_backend::BackendError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("report serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
