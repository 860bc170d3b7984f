//! Hostel and room records.

use std::sync::Arc;

use hims_backend::{
    AllocationStore, Backend, Hostel, HostelStore, NewHostel, NewRoom, Room, RoomStore,
};
use hims_core::{DomainError, HostelId, RoomId, UserId};

use crate::HousingError;

#[derive(Debug, Clone)]
pub struct NewHostelRequest {
    pub name: String,
    pub location: Option<String>,
    pub capacity: i32,
    pub warden_id: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct NewRoomRequest {
    pub hostel_id: HostelId,
    pub room_number: String,
    pub capacity: i32,
    pub floor: Option<i32>,
}

/// A room together with its current active-allocation count.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomOccupancy {
    pub room: Room,
    pub occupied: usize,
}

impl RoomOccupancy {
    pub fn is_full(&self) -> bool {
        self.occupied >= self.room.capacity.max(0) as usize
    }
}

pub struct HostelService {
    backend: Arc<dyn Backend>,
}

impl HostelService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All hostels, ordered by name.
    pub async fn list_hostels(&self) -> Result<Vec<Hostel>, HousingError> {
        let mut hostels = self.backend.list_hostels().await?;
        hostels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hostels)
    }

    pub async fn create_hostel(&self, new: NewHostelRequest) -> Result<Hostel, HousingError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("hostel name must not be blank").into());
        }
        if new.capacity <= 0 {
            return Err(DomainError::validation("hostel capacity must be positive").into());
        }

        let hostel = self
            .backend
            .insert_hostel(NewHostel {
                name: name.to_string(),
                location: new.location,
                capacity: new.capacity,
                warden_id: new.warden_id,
            })
            .await?;
        tracing::info!(hostel_id = %hostel.id, "hostel created");
        Ok(hostel)
    }

    /// Delete a hostel. Rooms, inventory, and allocations under it go with
    /// it (the data service cascades).
    pub async fn delete_hostel(&self, id: HostelId) -> Result<(), HousingError> {
        self.backend.delete_hostel(id).await?;
        tracing::info!(hostel_id = %id, "hostel deleted");
        Ok(())
    }

    /// Rooms of one hostel, ordered by room number.
    pub async fn list_rooms(&self, hostel_id: HostelId) -> Result<Vec<Room>, HousingError> {
        let mut rooms: Vec<Room> = self
            .backend
            .list_rooms()
            .await?
            .into_iter()
            .filter(|r| r.hostel_id == hostel_id)
            .collect();
        rooms.sort_by(|a, b| a.room_number.cmp(&b.room_number));
        Ok(rooms)
    }

    pub async fn create_room(&self, new: NewRoomRequest) -> Result<Room, HousingError> {
        let room_number = new.room_number.trim();
        if room_number.is_empty() {
            return Err(DomainError::validation("room number must not be blank").into());
        }
        if new.capacity < 1 {
            return Err(DomainError::validation("room capacity must be at least 1").into());
        }

        let room = self
            .backend
            .insert_room(NewRoom {
                hostel_id: new.hostel_id,
                room_number: room_number.to_string(),
                capacity: new.capacity,
                floor: new.floor,
            })
            .await?;
        tracing::info!(room_id = %room.id, hostel_id = %room.hostel_id, "room created");
        Ok(room)
    }

    /// Rooms of one hostel with their active-allocation counts.
    pub async fn room_occupancy(
        &self,
        hostel_id: HostelId,
    ) -> Result<Vec<RoomOccupancy>, HousingError> {
        let rooms = self.list_rooms(hostel_id).await?;
        let allocations = self.backend.list_allocations().await?;
        Ok(rooms
            .into_iter()
            .map(|room| {
                let occupied = allocations
                    .iter()
                    .filter(|a| a.room_id == room.id && a.is_active)
                    .count();
                RoomOccupancy { room, occupied }
            })
            .collect())
    }

    pub async fn find_room(&self, id: RoomId) -> Result<Option<Room>, HousingError> {
        Ok(self
            .backend
            .list_rooms()
            .await?
            .into_iter()
            .find(|r| r.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hims_backend::InMemoryBackend;

    fn service() -> HostelService {
        HostelService::new(Arc::new(InMemoryBackend::new()) as Arc<dyn Backend>)
    }

    #[tokio::test]
    async fn hostel_creation_validates_and_lists_sorted() {
        let service = service();
        assert!(
            service
                .create_hostel(NewHostelRequest {
                    name: "  ".to_string(),
                    location: None,
                    capacity: 10,
                    warden_id: None,
                })
                .await
                .is_err()
        );
        assert!(
            service
                .create_hostel(NewHostelRequest {
                    name: "West".to_string(),
                    location: None,
                    capacity: 0,
                    warden_id: None,
                })
                .await
                .is_err()
        );

        for name in ["West Wing", "East Wing"] {
            service
                .create_hostel(NewHostelRequest {
                    name: name.to_string(),
                    location: None,
                    capacity: 20,
                    warden_id: None,
                })
                .await
                .unwrap();
        }
        let names: Vec<String> = service
            .list_hostels()
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["East Wing", "West Wing"]);
    }

    #[tokio::test]
    async fn rooms_are_scoped_to_their_hostel() {
        let service = service();
        let a = service
            .create_hostel(NewHostelRequest {
                name: "A".to_string(),
                location: None,
                capacity: 10,
                warden_id: None,
            })
            .await
            .unwrap();
        let b = service
            .create_hostel(NewHostelRequest {
                name: "B".to_string(),
                location: None,
                capacity: 10,
                warden_id: None,
            })
            .await
            .unwrap();

        service
            .create_room(NewRoomRequest {
                hostel_id: a.id,
                room_number: "2".to_string(),
                capacity: 2,
                floor: None,
            })
            .await
            .unwrap();
        service
            .create_room(NewRoomRequest {
                hostel_id: a.id,
                room_number: "1".to_string(),
                capacity: 2,
                floor: None,
            })
            .await
            .unwrap();
        service
            .create_room(NewRoomRequest {
                hostel_id: b.id,
                room_number: "9".to_string(),
                capacity: 1,
                floor: None,
            })
            .await
            .unwrap();

        let numbers: Vec<String> = service
            .list_rooms(a.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.room_number)
            .collect();
        assert_eq!(numbers, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn room_validation() {
        let service = service();
        let hostel = service
            .create_hostel(NewHostelRequest {
                name: "A".to_string(),
                location: None,
                capacity: 10,
                warden_id: None,
            })
            .await
            .unwrap();

        assert!(
            service
                .create_room(NewRoomRequest {
                    hostel_id: hostel.id,
                    room_number: " ".to_string(),
                    capacity: 2,
                    floor: None,
                })
                .await
                .is_err()
        );
        assert!(
            service
                .create_room(NewRoomRequest {
                    hostel_id: hostel.id,
                    room_number: "1".to_string(),
                    capacity: 0,
                    floor: None,
                })
                .await
                .is_err()
        );
    }
}
