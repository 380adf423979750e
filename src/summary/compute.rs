use crate::storage::entity::{
    alert, distribution_record, rainfall_record, region, region_summary, resource,
};
use crate::storage::entity::{Alert, DistributionRecord, RainfallRecord, Region, Resource};
use crate::storage::vocab::Severity;
use chrono::{Days, NaiveDate};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

/// 统计窗口天数：date >= today - 7（含边界）
pub const WINDOW_DAYS: u64 = 7;

pub fn window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(WINDOW_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

/// 刷新时读取的五张基础表快照
#[derive(Debug, Clone, Default)]
pub struct BaseTables {
    pub regions: Vec<region::Model>,
    pub alerts: Vec<alert::Model>,
    pub resources: Vec<resource::Model>,
    pub distributions: Vec<distribution_record::Model>,
    pub rainfall: Vec<rainfall_record::Model>,
}

impl BaseTables {
    /// 在同一连接（通常是事务）上读取，保证一致读点。
    /// 预警和分发记录在 SQL 侧先按日期裁剪，降雨需要全量以求最新一条
    pub async fn load<C: ConnectionTrait>(
        conn: &C,
        today: NaiveDate,
    ) -> Result<Self, sea_orm::DbErr> {
        let regions = Region::find()
            .order_by_asc(region::Column::RegionName)
            .all(conn)
            .await?;
        let alerts = Alert::find()
            .filter(alert::Column::ExpiryDate.gte(today))
            .all(conn)
            .await?;
        let resources = Resource::find().all(conn).await?;
        let distributions = DistributionRecord::find()
            .filter(distribution_record::Column::DateDistributed.gte(window_start(today)))
            .all(conn)
            .await?;
        let rainfall = RainfallRecord::find().all(conn).await?;

        Ok(Self {
            regions,
            alerts,
            resources,
            distributions,
            rainfall,
        })
    }
}

#[derive(Default)]
struct AlertAgg {
    count: i32,
    max_rank: u8,
}

#[derive(Default)]
struct RainAgg {
    // (date, id, mm)，同日取 id 最大者
    latest: Option<(NaiveDate, i32, f64)>,
    window_sum: f64,
    window_n: u32,
}

/// 纯函数：由基础表计算每个区域一行汇总，区域顺序与输入一致。
/// 没有匹配数据的区域得到 0 / NULL 默认值，不会缺行
pub fn summarize(
    tables: &BaseTables,
    today: NaiveDate,
    refreshed_at: i64,
) -> Vec<region_summary::Model> {
    let cutoff = window_start(today);

    let mut alerts: HashMap<&str, AlertAgg> = HashMap::new();
    for a in tables.alerts.iter().filter(|a| a.expiry_date >= today) {
        let agg = alerts.entry(a.region.as_str()).or_default();
        agg.count += 1;
        let rank = Severity::from_label(&a.severity).map_or(0, Severity::rank);
        agg.max_rank = agg.max_rank.max(rank);
    }

    let mut stock: HashMap<&str, i64> = HashMap::new();
    for r in &tables.resources {
        *stock.entry(r.location.as_str()).or_default() += i64::from(r.quantity_available);
    }

    let mut sent: HashMap<i32, i64> = HashMap::new();
    for d in tables
        .distributions
        .iter()
        .filter(|d| d.date_distributed >= cutoff)
    {
        *sent.entry(d.region_id).or_default() += i64::from(d.quantity_sent);
    }

    let mut rain: HashMap<&str, RainAgg> = HashMap::new();
    for r in &tables.rainfall {
        let agg = rain.entry(r.region.as_str()).or_default();
        let newer = match agg.latest {
            Some((date, id, _)) => (r.date, r.id) > (date, id),
            None => true,
        };
        if newer {
            agg.latest = Some((r.date, r.id, r.rainfall_mm));
        }
        if r.date >= cutoff {
            agg.window_sum += r.rainfall_mm;
            agg.window_n += 1;
        }
    }

    tables
        .regions
        .iter()
        .map(|region| {
            let name = region.region_name.as_str();
            let (active_alerts_count, max_rank) = alerts
                .get(name)
                .map_or((0, 0), |a| (a.count, a.max_rank));
            let (latest_rainfall_mm, avg_rainfall_7d) = match rain.get(name) {
                Some(r) => (
                    r.latest.map(|(_, _, mm)| round2(mm)),
                    (r.window_n > 0).then(|| round2(r.window_sum / f64::from(r.window_n))),
                ),
                None => (None, None),
            };

            region_summary::Model {
                region_name: region.region_name.clone(),
                region_id: region.region_id,
                population: region.population,
                risk_level: Some(region.risk_level.clone()),
                active_alerts_count,
                highest_active_severity: Severity::from_rank(max_rank)
                    .map(|s| s.as_str().to_string()),
                total_resources_available: stock.get(name).copied().unwrap_or(0),
                distributions_last_7d: sent.get(&region.region_id).copied().unwrap_or(0),
                latest_rainfall_mm,
                avg_rainfall_7d,
                last_refreshed: refreshed_at,
            }
        })
        .collect()
}

// 与原表 DECIMAL(10,2) 精度一致
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
