//! Room allocations: which student sleeps where.

use std::sync::Arc;

use chrono::NaiveDate;

use hims_backend::{
    AllocationStore, Backend, NewAllocation, ProfileStore, RoomAllocation, RoomStore,
};
use hims_core::{AllocationId, DomainError, RoomId, UserId};

use crate::HousingError;

#[derive(Debug, Clone)]
pub struct NewAllocationRequest {
    pub room_id: RoomId,
    pub student_id: UserId,
    pub allocated_by: Option<UserId>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

pub struct AllocationService {
    backend: Arc<dyn Backend>,
}

impl AllocationService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All allocations, newest first.
    pub async fn list(&self) -> Result<Vec<RoomAllocation>, HousingError> {
        let mut allocations = self.backend.list_allocations().await?;
        allocations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(allocations)
    }

    /// Allocate a student to a room.
    ///
    /// The student must exist as a linked profile, the room must exist, and
    /// the room's active allocations must be below its capacity.
    pub async fn allocate(
        &self,
        new: NewAllocationRequest,
    ) -> Result<RoomAllocation, HousingError> {
        if self
            .backend
            .find_profile_by_user(new.student_id)
            .await?
            .is_none()
        {
            return Err(DomainError::validation("student does not exist").into());
        }

        let room = self
            .backend
            .list_rooms()
            .await?
            .into_iter()
            .find(|r| r.id == new.room_id)
            .ok_or_else(|| DomainError::validation("room does not exist"))?;

        let occupied = self
            .backend
            .list_allocations()
            .await?
            .iter()
            .filter(|a| a.room_id == room.id && a.is_active)
            .count();
        if occupied >= room.capacity.max(0) as usize {
            return Err(DomainError::conflict(format!(
                "room {} is at capacity ({occupied}/{})",
                room.room_number, room.capacity
            ))
            .into());
        }

        let allocation = self
            .backend
            .insert_allocation(NewAllocation {
                room_id: new.room_id,
                student_id: new.student_id,
                allocated_by: new.allocated_by,
                start_date: new.start_date,
                end_date: new.end_date,
                is_active: true,
            })
            .await?;
        tracing::info!(
            allocation_id = %allocation.id,
            room_id = %allocation.room_id,
            student_id = %allocation.student_id,
            "room allocated"
        );
        Ok(allocation)
    }

    /// Activate or deactivate an allocation. Deactivated allocations free
    /// their room slot.
    pub async fn set_active(&self, id: AllocationId, is_active: bool) -> Result<(), HousingError> {
        self.backend.set_allocation_active(id, is_active).await?;
        tracing::info!(allocation_id = %id, is_active, "allocation toggled");
        Ok(())
    }

    pub async fn delete(&self, id: AllocationId) -> Result<(), HousingError> {
        self.backend.delete_allocation(id).await?;
        tracing::info!(allocation_id = %id, "allocation deleted");
        Ok(())
    }
}
