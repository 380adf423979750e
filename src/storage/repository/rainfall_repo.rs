use crate::storage::entity::rainfall_record::{
    self, ActiveModel as RainfallActiveModel, Entity as RainfallRecord, Model as RainfallModel,
};
use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRainfall {
    pub region: String,
    pub date: NaiveDate,
    pub rainfall_mm: f64,
    pub temperature_c: Option<f64>,
    pub humidity: Option<f64>,
}

pub struct RainfallRepository;

impl RainfallRepository {
    pub async fn record(db: &DatabaseConnection, new: NewRainfall) -> Result<i32, sea_orm::DbErr> {
        let active_model = RainfallActiveModel {
            region: Set(new.region),
            date: Set(new.date),
            rainfall_mm: Set(new.rainfall_mm),
            temperature_c: Set(new.temperature_c),
            humidity: Set(new.humidity),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.id)
    }

    /// 按日期倒序，同日按 id 倒序
    pub async fn for_region(
        db: &DatabaseConnection,
        region: &str,
    ) -> Result<Vec<RainfallModel>, sea_orm::DbErr> {
        RainfallRecord::find()
            .filter(rainfall_record::Column::Region.eq(region))
            .order_by_desc(rainfall_record::Column::Date)
            .order_by_desc(rainfall_record::Column::Id)
            .all(db)
            .await
    }
}
