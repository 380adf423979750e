use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "distribution_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub log_id: i32,
    pub region_id: i32,
    pub resource_id: i32,
    pub quantity_sent: i32,
    pub date_distributed: Date,
    #[sea_orm(nullable)]
    pub distributed_by: Option<String>,
    #[sea_orm(nullable)]
    pub received_date: Option<Date>,
    pub delivery_status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::region::Entity",
        from = "Column::RegionId",
        to = "super::region::Column::RegionId"
    )]
    Region,
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::ResourceId",
        to = "super::resource::Column::ResourceId"
    )]
    Resource,
}

impl Related<super::region::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Region.def()
    }
}

impl Related<super::resource::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resource.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
