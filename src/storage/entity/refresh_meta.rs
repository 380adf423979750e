use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 单行表：最近一次成功刷新的时间，与汇总行在同一事务内写入。
/// 区域为空时汇总表没有行，刷新时间只能从这里取
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "summary_refresh_meta")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub last_refreshed: i64,
    pub regions: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
