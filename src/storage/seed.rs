//! 从 csv_sheets 目录导入五张基础表。
//!
//! 导入是整体替换：先清空全部基础表，再按文件内容写入，缺失的文件视为空表。
//! 分发记录按历史原样写入，不会再次扣减库存；库存状态按数量重新推导。

use crate::storage::entity::{
    alert, distribution_record, rainfall_record, region, resource, Alert, DistributionRecord,
    RainfallRecord, Region, Resource,
};
use crate::storage::error::StorageError;
use crate::storage::vocab::ResourceStatus;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use log::{info, warn};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set,
    TransactionTrait,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

const INSERT_CHUNK: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub regions: usize,
    pub alerts: usize,
    pub resources: usize,
    pub rainfall: usize,
    pub distributions: usize,
}

#[derive(Debug, Deserialize)]
struct RegionRow {
    region_id: i32,
    region_name: String,
    population: Option<i64>,
    risk_level: String,
    warning_status: Option<String>,
    last_update: Option<String>,
    report_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlertRow {
    alert_id: i32,
    region: String,
    alert_message: String,
    severity: String,
    date_issued: String,
    expiry_date: String,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceRow {
    resource_id: i32,
    resource_type: String,
    quantity_available: i32,
    location: String,
    last_restocked: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RainfallRow {
    id: i32,
    region: String,
    date: String,
    rainfall_mm: f64,
    temperature_c: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DistributionRow {
    log_id: i32,
    region_id: i32,
    resource_id: i32,
    quantity_sent: i32,
    date_distributed: String,
    distributed_by: Option<String>,
    received_date: Option<String>,
}

pub struct CsvSeeder;

impl CsvSeeder {
    pub async fn load_dir(
        db: &DatabaseConnection,
        dir: &Path,
        low_stock_threshold: i32,
    ) -> Result<SeedReport, StorageError> {
        let regions: Vec<RegionRow> = read_rows(dir, "affected_regions.csv")?;
        let alerts: Vec<AlertRow> = read_rows(dir, "alerts.csv")?;
        let resources: Vec<ResourceRow> = read_rows(dir, "resources.csv")?;
        let rainfall: Vec<RainfallRow> = read_rows(dir, "rainfall_data.csv")?;
        let distributions: Vec<DistributionRow> = read_rows(dir, "distribution_log.csv")?;

        let report = SeedReport {
            regions: regions.len(),
            alerts: alerts.len(),
            resources: resources.len(),
            rainfall: rainfall.len(),
            distributions: distributions.len(),
        };

        let now = Utc::now().timestamp();
        let region_models = regions
            .into_iter()
            .map(|r| {
                let file = "affected_regions.csv";
                let last_update = match r.last_update.as_deref() {
                    Some(s) if !s.trim().is_empty() => parse_timestamp(file, s)?,
                    _ => now,
                };
                Ok(region::ActiveModel {
                    region_id: Set(r.region_id),
                    region_name: Set(r.region_name),
                    population: Set(r.population),
                    risk_level: Set(r.risk_level),
                    warning_status: Set(parse_flag(r.warning_status.as_deref())),
                    last_update: Set(last_update),
                    report_date: Set(parse_opt_date(file, r.report_date.as_deref())?),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let alert_models = alerts
            .into_iter()
            .map(|a| {
                let file = "alerts.csv";
                Ok(alert::ActiveModel {
                    alert_id: Set(a.alert_id),
                    region: Set(a.region),
                    alert_message: Set(a.alert_message),
                    severity: Set(a.severity),
                    date_issued: Set(parse_date(file, &a.date_issued)?),
                    expiry_date: Set(parse_date(file, &a.expiry_date)?),
                    status: Set(a
                        .status
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| "Active".to_string())),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let resource_models = resources
            .into_iter()
            .map(|r| {
                let file = "resources.csv";
                if r.quantity_available < 0 {
                    return Err(StorageError::InvalidRow {
                        file: file.to_string(),
                        message: format!(
                            "resource {} has negative quantity {}",
                            r.resource_id, r.quantity_available
                        ),
                    });
                }
                let status = ResourceStatus::derive(r.quantity_available, low_stock_threshold);
                Ok(resource::ActiveModel {
                    resource_id: Set(r.resource_id),
                    resource_type: Set(r.resource_type),
                    quantity_available: Set(r.quantity_available),
                    location: Set(r.location),
                    status: Set(status.to_string()),
                    last_restocked: Set(parse_opt_date(file, r.last_restocked.as_deref())?),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let rainfall_models = rainfall
            .into_iter()
            .map(|r| {
                Ok(rainfall_record::ActiveModel {
                    id: Set(r.id),
                    region: Set(r.region),
                    date: Set(parse_date("rainfall_data.csv", &r.date)?),
                    rainfall_mm: Set(r.rainfall_mm),
                    temperature_c: Set(r.temperature_c),
                    humidity: Set(r.humidity),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let distribution_models = distributions
            .into_iter()
            .map(|d| {
                let file = "distribution_log.csv";
                let received_date = parse_opt_date(file, d.received_date.as_deref())?;
                let delivery_status = if received_date.is_some() {
                    "Delivered"
                } else {
                    "Dispatched"
                };
                Ok(distribution_record::ActiveModel {
                    log_id: Set(d.log_id),
                    region_id: Set(d.region_id),
                    resource_id: Set(d.resource_id),
                    quantity_sent: Set(d.quantity_sent),
                    date_distributed: Set(parse_date(file, &d.date_distributed)?),
                    distributed_by: Set(d.distributed_by.filter(|s| !s.trim().is_empty())),
                    received_date: Set(received_date),
                    delivery_status: Set(delivery_status.to_string()),
                })
            })
            .collect::<Result<Vec<_>, StorageError>>()?;

        let txn = db.begin().await?;

        // 先删引用方，再删被引用方
        DistributionRecord::delete_many().exec(&txn).await?;
        Alert::delete_many().exec(&txn).await?;
        RainfallRecord::delete_many().exec(&txn).await?;
        Resource::delete_many().exec(&txn).await?;
        Region::delete_many().exec(&txn).await?;

        insert_chunked(&txn, region_models).await?;
        insert_chunked(&txn, resource_models).await?;
        insert_chunked(&txn, alert_models).await?;
        insert_chunked(&txn, rainfall_models).await?;
        insert_chunked(&txn, distribution_models).await?;

        txn.commit().await?;

        info!(
            "✓ CSV 导入完成 ({}): 区域 {}, 预警 {}, 物资 {}, 降雨 {}, 分发 {}",
            dir.display(),
            report.regions,
            report.alerts,
            report.resources,
            report.rainfall,
            report.distributions
        );
        Ok(report)
    }
}

fn read_rows<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, StorageError> {
    let path = dir.join(file);
    if !path.exists() {
        warn!("未找到 {}, 按空表处理", path.display());
        return Ok(Vec::new());
    }
    let csv_err = |source| StorageError::Csv {
        file: file.to_string(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(&path)
        .map_err(csv_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(csv_err)
}

async fn insert_chunked<A, C>(conn: &C, models: Vec<A>) -> Result<(), sea_orm::DbErr>
where
    A: ActiveModelTrait + Send,
    <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
    C: ConnectionTrait,
{
    let mut iter = models.into_iter().peekable();
    while iter.peek().is_some() {
        let chunk: Vec<A> = iter.by_ref().take(INSERT_CHUNK).collect();
        <A::Entity as EntityTrait>::insert_many(chunk)
            .exec_without_returning(conn)
            .await?;
    }
    Ok(())
}

/// 日期列兼容 `2024-07-15` 与 `2024-07-15 08:30:00`
fn parse_date(file: &str, raw: &str) -> Result<NaiveDate, StorageError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|e| StorageError::InvalidRow {
            file: file.to_string(),
            message: format!("bad date {raw:?}: {e}"),
        })
}

fn parse_opt_date(file: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, StorageError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => parse_date(file, s).map(Some),
        _ => Ok(None),
    }
}

fn parse_timestamp(file: &str, raw: &str) -> Result<i64, StorageError> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<i64>() {
        return Ok(ts);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc().timestamp());
    }
    parse_date(file, raw).map(|d| d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp())
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|s| s.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "y")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_date_layouts() {
        let d = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(parse_date("x.csv", "2024-07-15").unwrap(), d);
        assert_eq!(parse_date("x.csv", "2024-07-15 08:30:00").unwrap(), d);
        assert!(parse_date("x.csv", "15/07/2024").is_err());
        assert_eq!(parse_opt_date("x.csv", Some("  ")).unwrap(), None);
    }

    #[test]
    fn warning_flags() {
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("True")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(None));
    }
}
