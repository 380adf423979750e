use crate::config::AppConfig;
use crate::storage::seed::CsvSeeder;
use crate::storage;
use crate::summary::RegionSummaryView;
use anyhow::Context;
use log::info;
use std::sync::Arc;

/// 启动后共享的物化视图，连接由视图持有
pub struct AppContext {
    pub view: Arc<RegionSummaryView>,
}

/// 连接数据库、建表，并按配置导入 CSV 基础数据
pub async fn bootstrap(config: &AppConfig) -> anyhow::Result<AppContext> {
    let db = storage::establish_connection(&config.database_url)
        .await
        .with_context(|| format!("数据库连接失败: {}", config.database_url))?;
    let db = Arc::new(db);

    if let Some(dir) = &config.seed_csv_dir {
        let report = CsvSeeder::load_dir(&db, dir, config.low_stock_threshold)
            .await
            .with_context(|| format!("CSV 导入失败: {}", dir.display()))?;
        info!("基础数据已从 CSV 导入: {:?}", report);
    }

    let view = Arc::new(RegionSummaryView::new(db));
    Ok(AppContext { view })
}
