//! Pure folds from row slices to report figures.

use serde::Serialize;

use hims_auth::Role;
use hims_backend::{
    Gender, Hostel, InventoryCategory, InventoryItem, Profile, Room, RoomAllocation, UserRole,
};
use hims_core::{HostelId, UserId};

/// Occupancy figures for one hostel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostelOccupancy {
    pub hostel_id: HostelId,
    pub hostel_name: String,
    pub capacity: i32,
    pub rooms: usize,
    pub active_allocations: usize,
    /// Active allocations over hostel capacity, 0.0 when capacity is 0.
    pub occupancy_rate: f64,
}

/// Per-category totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: InventoryCategory,
    pub items: usize,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySummary {
    pub total_items: usize,
    pub total_quantity: i64,
    pub by_category: Vec<CategorySummary>,
    pub low_stock: Vec<InventoryItem>,
}

/// One warden's activity figures and weighted score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WardenStats {
    pub user_id: UserId,
    pub full_name: String,
    pub email: String,
    pub gender: Option<Gender>,
    pub hostels: Vec<String>,
    pub hostels_count: usize,
    pub inventory_added: usize,
    pub allocations_made: usize,
    /// 0..=100, weighted 30/40/30 across hostels, items, allocations.
    pub performance_score: u32,
}

/// Occupancy per hostel, ordered by hostel name.
pub fn occupancy_by_hostel(
    hostels: &[Hostel],
    rooms: &[Room],
    allocations: &[RoomAllocation],
) -> Vec<HostelOccupancy> {
    let mut report: Vec<HostelOccupancy> = hostels
        .iter()
        .map(|hostel| {
            let hostel_rooms: Vec<&Room> =
                rooms.iter().filter(|r| r.hostel_id == hostel.id).collect();
            let active = allocations
                .iter()
                .filter(|a| a.is_active && hostel_rooms.iter().any(|r| r.id == a.room_id))
                .count();
            let rate = if hostel.capacity > 0 {
                active as f64 / hostel.capacity as f64
            } else {
                0.0
            };
            HostelOccupancy {
                hostel_id: hostel.id,
                hostel_name: hostel.name.clone(),
                capacity: hostel.capacity,
                rooms: hostel_rooms.len(),
                active_allocations: active,
                occupancy_rate: rate,
            }
        })
        .collect();
    report.sort_by(|a, b| a.hostel_name.cmp(&b.hostel_name));
    report
}

/// Totals per category plus the low-stock listing.
pub fn inventory_summary(items: &[InventoryItem]) -> InventorySummary {
    let by_category = InventoryCategory::ALL
        .iter()
        .map(|&category| {
            let of_category: Vec<&InventoryItem> =
                items.iter().filter(|i| i.category == category).collect();
            CategorySummary {
                category,
                items: of_category.len(),
                quantity: of_category.iter().map(|i| i.quantity as i64).sum(),
            }
        })
        .collect();

    let mut low_stock: Vec<InventoryItem> = items
        .iter()
        .filter(|i| i.is_low_stock())
        .cloned()
        .collect();
    low_stock.sort_by(|a, b| a.item_name.cmp(&b.item_name));

    InventorySummary {
        total_items: items.len(),
        total_quantity: items.iter().map(|i| i.quantity as i64).sum(),
        by_category,
        low_stock,
    }
}

const HOSTEL_WEIGHT: f64 = 30.0;
const INVENTORY_WEIGHT: f64 = 40.0;
const ALLOCATION_WEIGHT: f64 = 30.0;

const MAX_HOSTELS: f64 = 5.0;
const MAX_INVENTORY: f64 = 100.0;
const MAX_ALLOCATIONS: f64 = 50.0;

fn performance_score(hostels: usize, items: usize, allocations: usize) -> u32 {
    let hostel_score = (hostels as f64 / MAX_HOSTELS).min(1.0) * HOSTEL_WEIGHT;
    let inventory_score = (items as f64 / MAX_INVENTORY).min(1.0) * INVENTORY_WEIGHT;
    let allocation_score = (allocations as f64 / MAX_ALLOCATIONS).min(1.0) * ALLOCATION_WEIGHT;
    (hostel_score + inventory_score + allocation_score).round() as u32
}

/// Activity figures for every warden-role profile, best score first.
///
/// Hostels count management (`warden_id`), inventory counts authorship
/// (`created_by`), allocations count who allocated (`allocated_by`).
pub fn warden_performance(
    roles: &[UserRole],
    profiles: &[Profile],
    hostels: &[Hostel],
    items: &[InventoryItem],
    allocations: &[RoomAllocation],
) -> Vec<WardenStats> {
    let mut stats: Vec<WardenStats> = roles
        .iter()
        .filter(|r| r.role == Role::Warden)
        .filter_map(|r| {
            let profile = profiles.iter().find(|p| p.user_id == Some(r.user_id))?;
            let managed: Vec<String> = hostels
                .iter()
                .filter(|h| h.warden_id == Some(r.user_id))
                .map(|h| h.name.clone())
                .collect();
            let inventory_added = items
                .iter()
                .filter(|i| i.created_by == Some(r.user_id))
                .count();
            let allocations_made = allocations
                .iter()
                .filter(|a| a.allocated_by == Some(r.user_id))
                .count();
            Some(WardenStats {
                user_id: r.user_id,
                full_name: profile.full_name.clone(),
                email: profile.email.clone(),
                gender: profile.gender,
                hostels_count: managed.len(),
                hostels: managed,
                inventory_added,
                allocations_made,
                performance_score: performance_score(
                    hostels
                        .iter()
                        .filter(|h| h.warden_id == Some(r.user_id))
                        .count(),
                    inventory_added,
                    allocations_made,
                ),
            })
        })
        .collect();
    stats.sort_by(|a, b| b.performance_score.cmp(&a.performance_score));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hims_core::{AllocationId, ItemId, ProfileId, RoomId, UserRoleId};

    fn hostel(name: &str, capacity: i32, warden: Option<UserId>) -> Hostel {
        let now = Utc::now();
        Hostel {
            id: HostelId::new(),
            name: name.to_string(),
            location: None,
            capacity,
            warden_id: warden,
            created_at: now,
            updated_at: now,
        }
    }

    fn room(hostel_id: HostelId) -> Room {
        let now = Utc::now();
        Room {
            id: RoomId::new(),
            hostel_id,
            room_number: "A1".to_string(),
            capacity: 2,
            floor: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn allocation(room_id: RoomId, is_active: bool, by: Option<UserId>) -> RoomAllocation {
        let now = Utc::now();
        RoomAllocation {
            id: AllocationId::new(),
            room_id,
            student_id: UserId::new(),
            allocated_by: by,
            start_date: now.date_naive(),
            end_date: None,
            is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(
        name: &str,
        category: InventoryCategory,
        quantity: i32,
        min: Option<i32>,
        by: Option<UserId>,
    ) -> InventoryItem {
        let now = Utc::now();
        InventoryItem {
            id: ItemId::new(),
            hostel_id: HostelId::new(),
            item_name: name.to_string(),
            category,
            quantity,
            unit: None,
            min_stock_level: min,
            notes: None,
            created_by: by,
            created_at: now,
            updated_at: now,
        }
    }

    fn warden_profile(user_id: UserId, name: &str) -> Profile {
        let now = Utc::now();
        Profile {
            id: ProfileId::new(),
            user_id: Some(user_id),
            full_name: name.to_string(),
            email: format!("{name}@hostel.test"),
            phone: None,
            student_id: None,
            hostel_id: None,
            room_number: None,
            gender: Some(Gender::Female),
            created_at: now,
            updated_at: now,
        }
    }

    fn role(user_id: UserId, role: Role) -> UserRole {
        UserRole {
            id: UserRoleId::new(),
            user_id,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn occupancy_counts_only_active_allocations_in_the_hostel() {
        let h = hostel("North", 10, None);
        let other = hostel("South", 0, None);
        let r1 = room(h.id);
        let r2 = room(other.id);
        let allocations = vec![
            allocation(r1.id, true, None),
            allocation(r1.id, false, None),
            allocation(r2.id, true, None),
        ];

        let report = occupancy_by_hostel(
            &[h.clone(), other.clone()],
            &[r1, r2],
            &allocations,
        );
        assert_eq!(report.len(), 2);
        let north = report.iter().find(|o| o.hostel_name == "North").unwrap();
        assert_eq!(north.active_allocations, 1);
        assert!((north.occupancy_rate - 0.1).abs() < f64::EPSILON);

        // Zero-capacity hostels report a zero rate, not a division blowup.
        let south = report.iter().find(|o| o.hostel_name == "South").unwrap();
        assert_eq!(south.occupancy_rate, 0.0);
    }

    #[test]
    fn inventory_summary_totals_and_low_stock() {
        let items = vec![
            item("Soap", InventoryCategory::Consumables, 3, Some(5), None),
            item("Desk", InventoryCategory::Furniture, 10, Some(2), None),
            item("Kettle", InventoryCategory::Electronics, 1, None, None),
        ];
        let summary = inventory_summary(&items);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_quantity, 14);
        assert_eq!(summary.by_category.len(), InventoryCategory::ALL.len());
        let consumables = summary
            .by_category
            .iter()
            .find(|c| c.category == InventoryCategory::Consumables)
            .unwrap();
        assert_eq!(consumables.items, 1);
        assert_eq!(consumables.quantity, 3);

        let low: Vec<&str> = summary.low_stock.iter().map(|i| i.item_name.as_str()).collect();
        assert_eq!(low, vec!["Soap"]);
    }

    #[test]
    fn score_is_weighted_and_capped() {
        assert_eq!(performance_score(0, 0, 0), 0);
        assert_eq!(performance_score(5, 100, 50), 100);
        // Beyond the caps the score stays at the weight ceiling.
        assert_eq!(performance_score(12, 400, 99), 100);
        // Half of each cap rounds to half the total weight.
        assert_eq!(performance_score(3, 50, 25), 18 + 20 + 15);
    }

    #[test]
    fn wardens_are_ranked_by_score() {
        let busy = UserId::new();
        let idle = UserId::new();
        let student = UserId::new();
        let roles = vec![
            role(idle, Role::Warden),
            role(busy, Role::Warden),
            role(student, Role::Student),
        ];
        let profiles = vec![
            warden_profile(busy, "busy"),
            warden_profile(idle, "idle"),
            warden_profile(student, "student"),
        ];
        let hostels = vec![hostel("North", 10, Some(busy))];
        let items = vec![item("Desk", InventoryCategory::Furniture, 4, None, Some(busy))];
        let allocations: Vec<RoomAllocation> = Vec::new();

        let stats = warden_performance(&roles, &profiles, &hostels, &items, &allocations);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].full_name, "busy");
        assert_eq!(stats[0].hostels, vec!["North"]);
        assert_eq!(stats[0].inventory_added, 1);
        assert!(stats[0].performance_score > stats[1].performance_score);
    }
}
