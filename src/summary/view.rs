use crate::storage::repository::SummaryRepository;
use crate::summary::compute::{summarize, BaseTables};
use crate::summary::model::{AsOf, RefreshReport, RegionSummaryDto, SummaryError, SummarySnapshot};
use log::info;
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

/// 区域汇总的物化视图。刷新与读取都经由这里，汇总表不被其他代码写入
pub struct RegionSummaryView {
    db: Arc<DatabaseConnection>,
    refresh_lock: Mutex<()>,
}

impl RegionSummaryView {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            refresh_lock: Mutex::new(()),
        }
    }

    pub async fn refresh(&self) -> Result<RefreshReport, SummaryError> {
        self.refresh_as_of(AsOf::now()).await
    }

    /// 全量重算：清空汇总表、读基础表、逐区域重建，全部在一个事务内。
    /// 失败时事务回滚，旧汇总保持不变。同一时刻只允许一次刷新
    pub async fn refresh_as_of(&self, as_of: AsOf) -> Result<RefreshReport, SummaryError> {
        let _guard = self.refresh_lock.lock().await;
        let started = Instant::now();

        let txn = self.db.begin().await?;
        // 先写后读：写锁在读快照之前取得，外部写入者只会让这里等待而不会失败
        SummaryRepository::clear(&txn).await?;
        let tables = BaseTables::load(&txn, as_of.today).await?;
        let rows = summarize(&tables, as_of.today, as_of.refreshed_at);
        let regions = SummaryRepository::insert_all(&txn, rows).await?;
        SummaryRepository::record_refresh(&txn, as_of.refreshed_at, regions).await?;
        txn.commit().await?;

        let elapsed = started.elapsed();
        info!(
            "✓ 区域汇总已刷新: {} 个区域, 基准日 {}, 耗时 {:?}",
            regions, as_of.today, elapsed
        );

        Ok(RefreshReport {
            regions,
            refreshed_at: as_of.refreshed_at,
            elapsed,
        })
    }

    pub async fn get(&self, region_name: &str) -> Result<Option<RegionSummaryDto>, SummaryError> {
        let row = SummaryRepository::find_by_region(self.db.as_ref(), region_name).await?;
        Ok(row.map(RegionSummaryDto::from))
    }

    /// 汇总行与刷新时间在同一读事务内取出，不会跨越一次刷新
    pub async fn list(&self) -> Result<SummarySnapshot, SummaryError> {
        let txn = self.db.begin().await?;
        let rows = SummaryRepository::list_all(&txn).await?;
        let last_refreshed = SummaryRepository::last_refresh(&txn).await?;
        txn.commit().await?;
        Ok(SummarySnapshot {
            rows: rows.into_iter().map(RegionSummaryDto::from).collect(),
            last_refreshed,
        })
    }

    /// 把当前汇总导出为 CSV，列与 RegionSummaryDto 字段一致，返回写出的行数
    pub async fn export_csv(&self, path: &Path) -> Result<usize, SummaryError> {
        let snapshot = self.list().await?;
        let mut writer = csv::Writer::from_path(path)?;
        for row in &snapshot.rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("区域汇总已导出: {} 行 -> {}", snapshot.rows.len(), path.display());
        Ok(snapshot.rows.len())
    }
}
