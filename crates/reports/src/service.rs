//! Fetch-then-fold report layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use hims_backend::{
    AllocationStore, Backend, Hostel, HostelStore, InventoryItem, InventoryStore, Profile,
    ProfileStore, RoomAllocation, RoomStore, UserRoleStore,
};

use crate::ReportError;
use crate::aggregate::{
    HostelOccupancy, InventorySummary, WardenStats, inventory_summary, occupancy_by_hostel,
    warden_performance,
};

/// The downloadable whole-system snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct FullReport {
    pub generated_at: DateTime<Utc>,
    pub period: String,
    pub inventory: Vec<InventoryItem>,
    pub hostels: Vec<Hostel>,
    pub allocations: Vec<RoomAllocation>,
    pub profiles: Vec<Profile>,
}

impl FullReport {
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub struct ReportService {
    backend: Arc<dyn Backend>,
}

impl ReportService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn occupancy(&self) -> Result<Vec<HostelOccupancy>, ReportError> {
        let hostels = self.backend.list_hostels().await?;
        let rooms = self.backend.list_rooms().await?;
        let allocations = self.backend.list_allocations().await?;
        Ok(occupancy_by_hostel(&hostels, &rooms, &allocations))
    }

    pub async fn inventory(&self) -> Result<InventorySummary, ReportError> {
        let items = self.backend.list_items().await?;
        Ok(inventory_summary(&items))
    }

    pub async fn wardens(&self) -> Result<Vec<WardenStats>, ReportError> {
        let roles = self.backend.list_roles().await?;
        let profiles = self.backend.list_profiles().await?;
        let hostels = self.backend.list_hostels().await?;
        let items = self.backend.list_items().await?;
        let allocations = self.backend.list_allocations().await?;
        Ok(warden_performance(
            &roles,
            &profiles,
            &hostels,
            &items,
            &allocations,
        ))
    }

    /// Assemble the full snapshot for the given reporting period label.
    pub async fn full_report(&self, period: &str) -> Result<FullReport, ReportError> {
        Ok(FullReport {
            generated_at: Utc::now(),
            period: period.to_string(),
            inventory: self.backend.list_items().await?,
            hostels: self.backend.list_hostels().await?,
            allocations: self.backend.list_allocations().await?,
            profiles: self.backend.list_profiles().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hims_backend::{InMemoryBackend, NewHostel, NewItem, InventoryCategory};

    #[tokio::test]
    async fn full_report_serializes_every_table() {
        let backend = Arc::new(InMemoryBackend::new());
        let hostel = backend
            .insert_hostel(NewHostel {
                name: "North".to_string(),
                location: None,
                capacity: 40,
                warden_id: None,
            })
            .await
            .unwrap();
        backend
            .insert_item(NewItem {
                hostel_id: hostel.id,
                item_name: "Desk".to_string(),
                category: InventoryCategory::Furniture,
                quantity: 4,
                unit: None,
                min_stock_level: None,
                notes: None,
                created_by: None,
            })
            .await
            .unwrap();

        let service = ReportService::new(backend as Arc<dyn Backend>);
        let report = service.full_report("semester").await.unwrap();
        assert_eq!(report.period, "semester");
        assert_eq!(report.hostels.len(), 1);
        assert_eq!(report.inventory.len(), 1);

        let json: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert!(json.get("generated_at").is_some());
        assert_eq!(json["inventory"][0]["item_name"], "Desk");
        assert_eq!(json["inventory"][0]["category"], "furniture");
    }
}
