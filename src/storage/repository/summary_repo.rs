use crate::storage::entity::refresh_meta::{self, Entity as RefreshMeta};
use crate::storage::entity::region_summary::{
    self, ActiveModel as SummaryActiveModel, Entity as RegionSummary, Model as SummaryModel,
};
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, Set};

/// 单条 INSERT 的行数上限，避免超过 SQLite 绑定参数限制
const INSERT_CHUNK: usize = 64;

pub struct SummaryRepository;

/// 刷新元数据只有一行
const META_ROW_ID: i32 = 1;

impl SummaryRepository {
    /// 清空汇总表。刷新事务的第一条语句，先拿到写锁再读基础表，
    /// 避免读快照之后再升级写锁时遇到 SQLITE_BUSY
    pub async fn clear<C: ConnectionTrait>(conn: &C) -> Result<u64, sea_orm::DbErr> {
        let res = RegionSummary::delete_many().exec(conn).await?;
        Ok(res.rows_affected)
    }

    /// 分批写入汇总行。调用方负责提供事务
    pub async fn insert_all<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<SummaryModel>,
    ) -> Result<u64, sea_orm::DbErr> {
        let mut inserted = 0u64;
        let mut iter = rows.into_iter().peekable();
        while iter.peek().is_some() {
            let chunk: Vec<SummaryActiveModel> = iter
                .by_ref()
                .take(INSERT_CHUNK)
                .map(to_active_model)
                .collect();
            inserted += RegionSummary::insert_many(chunk)
                .exec_without_returning(conn)
                .await?;
        }
        Ok(inserted)
    }

    /// 记录本次刷新时间，覆盖上一条
    pub async fn record_refresh<C: ConnectionTrait>(
        conn: &C,
        refreshed_at: i64,
        regions: u64,
    ) -> Result<(), sea_orm::DbErr> {
        RefreshMeta::delete_many().exec(conn).await?;
        RefreshMeta::insert(refresh_meta::ActiveModel {
            id: Set(META_ROW_ID),
            last_refreshed: Set(refreshed_at),
            regions: Set(i64::try_from(regions).unwrap_or(i64::MAX)),
        })
        .exec_without_returning(conn)
        .await?;
        Ok(())
    }

    /// 从未成功刷新过时为 None
    pub async fn last_refresh<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Option<i64>, sea_orm::DbErr> {
        let meta = RefreshMeta::find_by_id(META_ROW_ID).one(conn).await?;
        Ok(meta.map(|m| m.last_refreshed))
    }

    pub async fn find_by_region<C: ConnectionTrait>(
        conn: &C,
        region_name: &str,
    ) -> Result<Option<SummaryModel>, sea_orm::DbErr> {
        RegionSummary::find_by_id(region_name.to_string())
            .one(conn)
            .await
    }

    pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<SummaryModel>, sea_orm::DbErr> {
        RegionSummary::find()
            .order_by_asc(region_summary::Column::RegionName)
            .all(conn)
            .await
    }
}

fn to_active_model(m: SummaryModel) -> SummaryActiveModel {
    SummaryActiveModel {
        region_name: Set(m.region_name),
        region_id: Set(m.region_id),
        population: Set(m.population),
        risk_level: Set(m.risk_level),
        active_alerts_count: Set(m.active_alerts_count),
        highest_active_severity: Set(m.highest_active_severity),
        total_resources_available: Set(m.total_resources_available),
        distributions_last_7d: Set(m.distributions_last_7d),
        latest_rainfall_mm: Set(m.latest_rainfall_mm),
        avg_rainfall_7d: Set(m.avg_rainfall_7d),
        last_refreshed: Set(m.last_refreshed),
    }
}
