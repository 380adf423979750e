use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 降雨观测记录，只追加不修改
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rainfall_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub region: String, // 对应 affected_regions.region_name
    pub date: Date,
    pub rainfall_mm: f64,
    #[sea_orm(nullable)]
    pub temperature_c: Option<f64>,
    #[sea_orm(nullable)]
    pub humidity: Option<f64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
