use crate::storage::entity::region::{
    self, ActiveModel as RegionActiveModel, Entity as Region, Model as RegionModel,
};
use crate::storage::vocab::RiskLevel;
use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRegion {
    pub region_name: String,
    pub population: Option<i64>,
    pub risk_level: RiskLevel,
    pub warning_status: bool,
    pub report_date: Option<NaiveDate>,
}

pub struct RegionRepository;

impl RegionRepository {
    pub async fn create(db: &DatabaseConnection, new: NewRegion) -> Result<i32, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let active_model = RegionActiveModel {
            region_name: Set(new.region_name),
            population: Set(new.population),
            risk_level: Set(new.risk_level.to_string()),
            warning_status: Set(new.warning_status),
            last_update: Set(now),
            report_date: Set(new.report_date),
            ..Default::default()
        };
        let model = active_model.insert(db).await?;
        Ok(model.region_id)
    }

    pub async fn find_by_name(
        db: &DatabaseConnection,
        region_name: &str,
    ) -> Result<Option<RegionModel>, sea_orm::DbErr> {
        Region::find()
            .filter(region::Column::RegionName.eq(region_name))
            .one(db)
            .await
    }

    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<RegionModel>, sea_orm::DbErr> {
        Region::find()
            .order_by_asc(region::Column::RegionName)
            .all(db)
            .await
    }

    /// 外部风险评估更新区域等级与预警标志，返回受影响行数
    pub async fn update_risk(
        db: &DatabaseConnection,
        region_id: i32,
        risk_level: RiskLevel,
        warning_status: bool,
    ) -> Result<u64, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let res = Region::update_many()
            .col_expr(region::Column::RiskLevel, Expr::value(risk_level.to_string()))
            .col_expr(region::Column::WarningStatus, Expr::value(warning_status))
            .col_expr(region::Column::LastUpdate, Expr::value(now))
            .filter(region::Column::RegionId.eq(region_id))
            .exec(db)
            .await?;
        Ok(res.rows_affected)
    }
}
