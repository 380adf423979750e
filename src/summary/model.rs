use crate::storage::entity::region_summary::Model as SummaryModel;
use crate::storage::vocab::Severity;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("refresh scheduler is not running")]
    SchedulerStopped,
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 一次刷新的时间基准：today 用于有效期与 7 日窗口，refreshed_at 写入 last_refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsOf {
    pub today: NaiveDate,
    pub refreshed_at: i64,
}

impl AsOf {
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            today: now.date_naive(),
            refreshed_at: now.timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummaryDto {
    pub region_name: String,
    pub region_id: i32,
    pub population: Option<i64>,
    pub risk_level: Option<String>,
    pub active_alerts_count: i32,
    pub highest_active_severity: Option<Severity>,
    pub total_resources_available: i64,
    pub distributions_last_7d: i64,
    pub latest_rainfall_mm: Option<f64>,
    pub avg_rainfall_7d: Option<f64>,
    pub last_refreshed: i64,
}

impl RegionSummaryDto {
    /// 距上次刷新的秒数，调用方据此判断数据是否过旧
    pub fn age_secs(&self, now: i64) -> i64 {
        (now - self.last_refreshed).max(0)
    }
}

impl From<SummaryModel> for RegionSummaryDto {
    fn from(model: SummaryModel) -> Self {
        Self {
            region_name: model.region_name,
            region_id: model.region_id,
            population: model.population,
            risk_level: model.risk_level,
            active_alerts_count: model.active_alerts_count,
            highest_active_severity: model
                .highest_active_severity
                .as_deref()
                .and_then(Severity::from_label),
            total_resources_available: model.total_resources_available,
            distributions_last_7d: model.distributions_last_7d,
            latest_rainfall_mm: model.latest_rainfall_mm,
            avg_rainfall_7d: model.avg_rainfall_7d,
            last_refreshed: model.last_refreshed,
        }
    }
}

/// 全部汇总行及其刷新时间。从未刷新过表示“未知”，而不是“没有灾情”；
/// 刷新过但没有区域时 rows 为空、last_refreshed 仍有值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummarySnapshot {
    pub rows: Vec<RegionSummaryDto>,
    pub last_refreshed: Option<i64>,
}

impl SummarySnapshot {
    pub fn is_unknown(&self) -> bool {
        self.last_refreshed.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub regions: u64,
    pub refreshed_at: i64,
    pub elapsed: Duration,
}
