//! Inventory item management.

use std::sync::Arc;

use hims_backend::{Backend, InventoryCategory, InventoryItem, InventoryStore, NewItem};
use hims_core::{DomainError, HostelId, ItemId, UserId};

use crate::InventoryError;

#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub hostel_id: HostelId,
    pub item_name: String,
    pub category: InventoryCategory,
    pub quantity: i32,
    pub unit: Option<String>,
    pub min_stock_level: Option<i32>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
}

/// Full replacement of the editable columns of an item.
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub item_name: String,
    pub category: InventoryCategory,
    pub quantity: i32,
    pub unit: Option<String>,
    pub min_stock_level: Option<i32>,
    pub notes: Option<String>,
}

pub struct InventoryService {
    backend: Arc<dyn Backend>,
}

impl InventoryService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// All items, ordered by name.
    pub async fn list(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        let mut items = self.backend.list_items().await?;
        items.sort_by(|a, b| a.item_name.cmp(&b.item_name));
        Ok(items)
    }

    /// Items of one category, ordered by name.
    pub async fn list_by_category(
        &self,
        category: InventoryCategory,
    ) -> Result<Vec<InventoryItem>, InventoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|i| i.category == category)
            .collect())
    }

    /// Items at or below their minimum stock level.
    pub async fn low_stock(&self) -> Result<Vec<InventoryItem>, InventoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(InventoryItem::is_low_stock)
            .collect())
    }

    pub async fn add(&self, new: NewItemRequest) -> Result<InventoryItem, InventoryError> {
        let item_name = validated_name(&new.item_name)?;
        validate_quantities(new.quantity, new.min_stock_level)?;

        let item = self
            .backend
            .insert_item(NewItem {
                hostel_id: new.hostel_id,
                item_name,
                category: new.category,
                quantity: new.quantity,
                unit: new.unit,
                min_stock_level: new.min_stock_level,
                notes: new.notes,
                created_by: new.created_by,
            })
            .await?;
        tracing::info!(item_id = %item.id, hostel_id = %item.hostel_id, "item added");
        Ok(item)
    }

    pub async fn update(
        &self,
        id: ItemId,
        update: ItemUpdate,
    ) -> Result<InventoryItem, InventoryError> {
        let item_name = validated_name(&update.item_name)?;
        validate_quantities(update.quantity, update.min_stock_level)?;

        let existing = self
            .backend
            .list_items()
            .await?
            .into_iter()
            .find(|i| i.id == id)
            .ok_or(DomainError::NotFound)?;

        let updated = InventoryItem {
            item_name,
            category: update.category,
            quantity: update.quantity,
            unit: update.unit,
            min_stock_level: update.min_stock_level,
            notes: update.notes,
            ..existing
        };
        self.backend.update_item(&updated).await?;
        Ok(updated)
    }

    pub async fn remove(&self, id: ItemId) -> Result<(), InventoryError> {
        self.backend.delete_item(id).await?;
        tracing::info!(item_id = %id, "item removed");
        Ok(())
    }
}

fn validated_name(name: &str) -> Result<String, InventoryError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("item name must not be blank").into());
    }
    Ok(trimmed.to_string())
}

fn validate_quantities(quantity: i32, min_stock_level: Option<i32>) -> Result<(), InventoryError> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity must not be negative").into());
    }
    if min_stock_level.is_some_and(|m| m < 0) {
        return Err(DomainError::validation("minimum stock level must not be negative").into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hims_backend::{HostelStore, InMemoryBackend, NewHostel};

    async fn service() -> (InventoryService, HostelId) {
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
        (
            InventoryService::new(backend as Arc<dyn Backend>),
            hostel.id,
        )
    }

    fn item(hostel_id: HostelId, name: &str, quantity: i32) -> NewItemRequest {
        NewItemRequest {
            hostel_id,
            item_name: name.to_string(),
            category: InventoryCategory::Furniture,
            quantity,
            unit: None,
            min_stock_level: None,
            notes: None,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn add_validates_and_list_sorts_by_name() {
        let (service, hostel_id) = service().await;
        assert!(service.add(item(hostel_id, "  ", 1)).await.is_err());
        assert!(service.add(item(hostel_id, "Desk", -1)).await.is_err());

        service.add(item(hostel_id, "Mattress", 10)).await.unwrap();
        service.add(item(hostel_id, "Desk", 4)).await.unwrap();

        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.item_name)
            .collect();
        assert_eq!(names, vec!["Desk", "Mattress"]);
    }

    #[tokio::test]
    async fn low_stock_respects_threshold() {
        let (service, hostel_id) = service().await;
        service
            .add(NewItemRequest {
                min_stock_level: Some(5),
                ..item(hostel_id, "Soap", 5)
            })
            .await
            .unwrap();
        service
            .add(NewItemRequest {
                min_stock_level: Some(5),
                ..item(hostel_id, "Buckets", 6)
            })
            .await
            .unwrap();
        // No threshold set: never low.
        service.add(item(hostel_id, "Chairs", 0)).await.unwrap();

        let low: Vec<String> = service
            .low_stock()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.item_name)
            .collect();
        assert_eq!(low, vec!["Soap"]);
    }

    #[tokio::test]
    async fn update_replaces_editable_columns() {
        let (service, hostel_id) = service().await;
        let created = service
            .add(NewItemRequest {
                category: InventoryCategory::Consumables,
                ..item(hostel_id, "Soap", 20)
            })
            .await
            .unwrap();

        let updated = service
            .update(
                created.id,
                ItemUpdate {
                    item_name: "Soap bars".to_string(),
                    category: InventoryCategory::Consumables,
                    quantity: 12,
                    unit: Some("bar".to_string()),
                    min_stock_level: Some(10),
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 12);
        assert_eq!(updated.unit.as_deref(), Some("bar"));

        assert!(
            service
                .update(ItemId::new(), ItemUpdate {
                    item_name: "Ghost".to_string(),
                    category: InventoryCategory::Other,
                    quantity: 1,
                    unit: None,
                    min_stock_level: None,
                    notes: None,
                })
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn category_filter() {
        let (service, hostel_id) = service().await;
        service
            .add(NewItemRequest {
                category: InventoryCategory::Electronics,
                ..item(hostel_id, "Kettle", 2)
            })
            .await
            .unwrap();
        service.add(item(hostel_id, "Desk", 4)).await.unwrap();

        let electronics = service
            .list_by_category(InventoryCategory::Electronics)
            .await
            .unwrap();
        assert_eq!(electronics.len(), 1);
        assert_eq!(electronics[0].item_name, "Kettle");
    }
}
