use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub alert_id: i32,
    pub region: String, // 对应 affected_regions.region_name
    pub alert_message: String,
    pub severity: String, // Low / Moderate / High / Critical，允许扩展值
    pub date_issued: Date,
    pub expiry_date: Date,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
