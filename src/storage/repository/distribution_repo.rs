use crate::storage::entity::distribution_record::{
    self, ActiveModel as DistributionActiveModel, Entity as DistributionRecord,
    Model as DistributionModel,
};
use crate::storage::entity::region::Entity as Region;
use crate::storage::entity::resource::{self, Entity as Resource};
use crate::storage::error::StorageError;
use crate::storage::vocab::ResourceStatus;
use chrono::NaiveDate;
use log::info;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDistribution {
    pub region_id: i32,
    pub resource_id: i32,
    pub quantity_sent: i32,
    pub date_distributed: NaiveDate,
    pub distributed_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionReceipt {
    pub log_id: i32,
    pub resource_id: i32,
    pub remaining_quantity: i32,
    pub resource_status: String,
}

pub struct DistributionRepository;

impl DistributionRepository {
    /// 登记一次物资分发：扣减库存并写入分发记录，两步在同一事务内完成。
    /// 任一步失败都不会留下部分写入。
    pub async fn record_distribution(
        db: &DatabaseConnection,
        new: NewDistribution,
        low_stock_threshold: i32,
    ) -> Result<DistributionReceipt, StorageError> {
        if new.quantity_sent <= 0 {
            return Err(StorageError::InvalidQuantity(new.quantity_sent));
        }

        let txn = db.begin().await?;

        // 条件扣减作为事务第一条语句：先拿写锁，库存不足时不更新任何行
        let debited = Resource::update_many()
            .col_expr(
                resource::Column::QuantityAvailable,
                Expr::col(resource::Column::QuantityAvailable).sub(new.quantity_sent),
            )
            .filter(resource::Column::ResourceId.eq(new.resource_id))
            .filter(resource::Column::QuantityAvailable.gte(new.quantity_sent))
            .exec(&txn)
            .await?;
        if debited.rows_affected == 0 {
            let err = match Resource::find_by_id(new.resource_id).one(&txn).await? {
                None => StorageError::NotFound {
                    entity: "resource",
                    id: new.resource_id.to_string(),
                },
                Some(stock) => StorageError::InsufficientStock {
                    resource_id: stock.resource_id,
                    available: stock.quantity_available,
                    requested: new.quantity_sent,
                },
            };
            txn.rollback().await?;
            return Err(err);
        }

        if Region::find_by_id(new.region_id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Err(StorageError::NotFound {
                entity: "region",
                id: new.region_id.to_string(),
            });
        }

        let stock = Resource::find_by_id(new.resource_id)
            .one(&txn)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                entity: "resource",
                id: new.resource_id.to_string(),
            })?;
        let remaining = stock.quantity_available;
        let status = ResourceStatus::derive(remaining, low_stock_threshold);
        Resource::update_many()
            .col_expr(resource::Column::Status, Expr::value(status.to_string()))
            .filter(resource::Column::ResourceId.eq(stock.resource_id))
            .exec(&txn)
            .await?;

        let log = DistributionActiveModel {
            region_id: Set(new.region_id),
            resource_id: Set(new.resource_id),
            quantity_sent: Set(new.quantity_sent),
            date_distributed: Set(new.date_distributed),
            distributed_by: Set(new.distributed_by),
            received_date: Set(None),
            delivery_status: Set("Dispatched".to_string()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(
            "物资分发已登记 [log {}]: resource {} -> region {}, 数量 {}, 剩余 {} ({})",
            log.log_id, stock.resource_id, new.region_id, new.quantity_sent, remaining, status
        );

        Ok(DistributionReceipt {
            log_id: log.log_id,
            resource_id: stock.resource_id,
            remaining_quantity: remaining,
            resource_status: status.to_string(),
        })
    }

    pub async fn for_region(
        db: &DatabaseConnection,
        region_id: i32,
    ) -> Result<Vec<DistributionModel>, sea_orm::DbErr> {
        DistributionRecord::find()
            .filter(distribution_record::Column::RegionId.eq(region_id))
            .order_by_desc(distribution_record::Column::DateDistributed)
            .all(db)
            .await
    }
}
