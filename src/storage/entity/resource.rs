use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resources")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub resource_id: i32,
    pub resource_type: String,
    pub quantity_available: i32,
    pub location: String, // 按 region_name 匹配
    pub status: String,   // Available / Low Stock / Depleted，由数量推导
    #[sea_orm(nullable)]
    pub last_restocked: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::distribution_record::Entity")]
    DistributionRecord,
}

impl Related<super::distribution_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
