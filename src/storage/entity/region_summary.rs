use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 物化汇总表：每个区域一行，只由刷新任务整体重建
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "region_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub region_name: String,
    pub region_id: i32,
    #[sea_orm(nullable)]
    pub population: Option<i64>,
    #[sea_orm(nullable)]
    pub risk_level: Option<String>,
    pub active_alerts_count: i32,
    #[sea_orm(nullable)]
    pub highest_active_severity: Option<String>,
    pub total_resources_available: i64,
    pub distributions_last_7d: i64,
    #[sea_orm(nullable)]
    pub latest_rainfall_mm: Option<f64>,
    #[sea_orm(nullable)]
    pub avg_rainfall_7d: Option<f64>,
    pub last_refreshed: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
