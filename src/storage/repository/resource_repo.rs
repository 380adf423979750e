use crate::storage::entity::resource::{
    self, ActiveModel as ResourceActiveModel, Entity as Resource, Model as ResourceModel,
};
use crate::storage::error::StorageError;
use crate::storage::vocab::ResourceStatus;
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResource {
    pub resource_type: String,
    pub quantity_available: i32,
    pub location: String,
    pub last_restocked: Option<NaiveDate>,
}

pub struct ResourceRepository;

impl ResourceRepository {
    pub async fn create(
        db: &DatabaseConnection,
        new: NewResource,
        low_stock_threshold: i32,
    ) -> Result<i32, StorageError> {
        if new.quantity_available < 0 {
            return Err(StorageError::InvalidQuantity(new.quantity_available));
        }
        let status = ResourceStatus::derive(new.quantity_available, low_stock_threshold);
        let active_model = ResourceActiveModel {
            resource_type: Set(new.resource_type),
            quantity_available: Set(new.quantity_available),
            location: Set(new.location),
            status: Set(status.to_string()),
            last_restocked: Set(new.last_restocked),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.resource_id)
    }

    pub async fn find(
        db: &DatabaseConnection,
        resource_id: i32,
    ) -> Result<Option<ResourceModel>, sea_orm::DbErr> {
        Resource::find_by_id(resource_id).one(db).await
    }

    /// 补货：数量增加并按阈值重新推导状态
    pub async fn restock(
        db: &DatabaseConnection,
        resource_id: i32,
        added: i32,
        restocked_on: NaiveDate,
        low_stock_threshold: i32,
    ) -> Result<ResourceModel, StorageError> {
        if added <= 0 {
            return Err(StorageError::InvalidQuantity(added));
        }
        let existing = Resource::find_by_id(resource_id)
            .one(db)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "resource",
                id: resource_id.to_string(),
            })?;

        let quantity = existing
            .quantity_available
            .checked_add(added)
            .ok_or(StorageError::InvalidQuantity(added))?;
        let mut am: ResourceActiveModel = existing.into();
        am.quantity_available = Set(quantity);
        am.status = Set(ResourceStatus::derive(quantity, low_stock_threshold).to_string());
        am.last_restocked = Set(Some(restocked_on));
        Ok(am.update(db).await?)
    }

    /// 低库存：数量低于阈值且尚未耗尽
    pub async fn low_stock(
        db: &DatabaseConnection,
        low_stock_threshold: i32,
    ) -> Result<Vec<ResourceModel>, sea_orm::DbErr> {
        Resource::find()
            .filter(resource::Column::QuantityAvailable.lt(low_stock_threshold))
            .filter(resource::Column::QuantityAvailable.gt(0))
            .order_by_asc(resource::Column::QuantityAvailable)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::establish_connection;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 10).unwrap()
    }

    #[tokio::test]
    async fn restock_recomputes_status() {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        let id = ResourceRepository::create(
            &db,
            NewResource {
                resource_type: "Food Packets".to_string(),
                quantity_available: 20,
                location: "Mandi".to_string(),
                last_restocked: None,
            },
            100,
        )
        .await
        .unwrap();

        let low = ResourceRepository::low_stock(&db, 100).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].status, "Low Stock");

        let updated = ResourceRepository::restock(&db, id, 180, today(), 100)
            .await
            .unwrap();
        assert_eq!(updated.quantity_available, 200);
        assert_eq!(updated.status, "Available");
        assert_eq!(updated.last_restocked, Some(today()));
        assert!(ResourceRepository::low_stock(&db, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restock_rejects_unknown_resource() {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        let err = ResourceRepository::restock(&db, 42, 10, today(), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "resource", .. }));
    }

    #[tokio::test]
    async fn restock_rejects_overflowing_quantity() {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        let id = ResourceRepository::create(
            &db,
            NewResource {
                resource_type: "Water Bottles".to_string(),
                quantity_available: i32::MAX - 5,
                location: "Kullu".to_string(),
                last_restocked: None,
            },
            100,
        )
        .await
        .unwrap();

        let err = ResourceRepository::restock(&db, id, 10, today(), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidQuantity(10)));
        let unchanged = ResourceRepository::find(&db, id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity_available, i32::MAX - 5);
        assert_eq!(unchanged.last_restocked, None);
    }
}
