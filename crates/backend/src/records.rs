//! Row types of the data service's logical tables.
//!
//! Field names and enum wire values mirror the hosted schema exactly; the
//! `New*` companions carry the caller-supplied columns of an insert (ids and
//! timestamps are generated by the store).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use hims_auth::Role;
use hims_core::{AllocationId, HostelId, ItemId, ProfileId, RoomId, UserId, UserRoleId};

/// Registered gender of a profile (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Inventory item category (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryCategory {
    Furniture,
    Consumables,
    Electronics,
    Other,
}

impl InventoryCategory {
    pub const ALL: [InventoryCategory; 4] = [
        InventoryCategory::Furniture,
        InventoryCategory::Consumables,
        InventoryCategory::Electronics,
        InventoryCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryCategory::Furniture => "furniture",
            InventoryCategory::Consumables => "consumables",
            InventoryCategory::Electronics => "electronics",
            InventoryCategory::Other => "other",
        }
    }
}

/// Application-level metadata about a person.
///
/// `user_id` is nullable: a profile may exist without a login (a student
/// record created by an administrator). At most one profile exists per user
/// id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub student_id: Option<String>,
    pub hostel_id: Option<HostelId>,
    pub room_number: Option<String>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Student records are profiles carrying a student identifier.
    pub fn is_student(&self) -> bool {
        self.student_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostel_id: Option<HostelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Role assignment row; one per user at most.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostel {
    pub id: HostelId,
    pub name: String,
    pub location: Option<String>,
    pub capacity: i32,
    pub warden_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewHostel {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub capacity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warden_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub hostel_id: HostelId,
    pub room_number: String,
    pub capacity: i32,
    pub floor: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRoom {
    pub hostel_id: HostelId,
    pub room_number: String,
    pub capacity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: ItemId,
    pub hostel_id: HostelId,
    pub item_name: String,
    pub category: InventoryCategory,
    pub quantity: i32,
    pub unit: Option<String>,
    pub min_stock_level: Option<i32>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Low stock: quantity at or below the configured threshold.
    pub fn is_low_stock(&self) -> bool {
        self.min_stock_level
            .is_some_and(|level| self.quantity <= level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub hostel_id: HostelId,
    pub item_name: String,
    pub category: InventoryCategory,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

/// A room allocation. `student_id` is the student's **user** id (the link
/// between the profile and the identity service), matching the hosted
/// schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAllocation {
    pub id: AllocationId,
    pub room_id: RoomId,
    pub student_id: UserId,
    pub allocated_by: Option<UserId>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAllocation {
    pub room_id: RoomId,
    pub student_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_by: Option<UserId>,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
}
