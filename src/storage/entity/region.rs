use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "affected_regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub region_id: i32,
    #[sea_orm(unique)]
    pub region_name: String,
    #[sea_orm(nullable)]
    pub population: Option<i64>,
    pub risk_level: String, // Low / Medium / High / Critical
    pub warning_status: bool,
    pub last_update: i64,
    #[sea_orm(nullable)]
    pub report_date: Option<Date>,
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
