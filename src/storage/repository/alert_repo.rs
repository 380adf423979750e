use crate::storage::entity::alert::{
    self, ActiveModel as AlertActiveModel, Entity as Alert, Model as AlertModel,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlert {
    pub region: String,
    pub alert_message: String,
    pub severity: String,
    pub date_issued: NaiveDate,
    pub expiry_date: NaiveDate,
}

pub struct AlertRepository;

impl AlertRepository {
    pub async fn issue(db: &DatabaseConnection, new: NewAlert) -> Result<i32, sea_orm::DbErr> {
        let active_model = AlertActiveModel {
            region: Set(new.region),
            alert_message: Set(new.alert_message),
            severity: Set(new.severity),
            date_issued: Set(new.date_issued),
            expiry_date: Set(new.expiry_date),
            status: Set("Active".to_string()),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.alert_id)
    }

    /// 有效预警：expiry_date >= today（当天到期仍算有效）
    pub async fn active_for_region(
        db: &DatabaseConnection,
        region: &str,
        today: NaiveDate,
    ) -> Result<Vec<AlertModel>, sea_orm::DbErr> {
        Alert::find()
            .filter(alert::Column::Region.eq(region))
            .filter(alert::Column::ExpiryDate.gte(today))
            .order_by_desc(alert::Column::DateIssued)
            .all(db)
            .await
    }

    pub async fn delete(db: &DatabaseConnection, alert_id: i32) -> Result<bool, sea_orm::DbErr> {
        let res = Alert::delete_by_id(alert_id).exec(db).await?;
        Ok(res.rows_affected > 0)
    }
}
