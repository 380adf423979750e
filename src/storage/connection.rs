use crate::storage::entity::{
    Alert, DistributionRecord, RainfallRecord, RefreshMeta, Region, RegionSummary, Resource,
};
use log::info;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};
use std::time::Duration;

pub async fn establish_connection(db_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(connect_options(db_url)).await?;

    // 启用 WAL 模式（内存库会返回 memory，无影响）
    let _ = sea_orm::ConnectionTrait::execute(
        &db,
        sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            "PRAGMA journal_mode=WAL;".to_string(),
        ),
    )
    .await?;

    init_schema(&db).await?;

    info!("Database connection established with WAL mode and tables initialized.");

    Ok(db)
}

fn connect_options(db_url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(db_url.to_owned());
    if db_url.contains(":memory:") {
        // 每个连接各自持有一份内存库，只能用单连接且不能被回收
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(10)
            .min_connections(2)
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800));
    }
    opt.connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Info);
    opt
}

/// 建表（如果不存在）。被引用的表先建
async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, Region).await?;
    create_table(db, Resource).await?;
    create_table(db, Alert).await?;
    create_table(db, RainfallRecord).await?;
    create_table(db, DistributionRecord).await?;
    create_table(db, RegionSummary).await?;
    create_table(db, RefreshMeta).await?;

    // 刷新时按区域聚合的查询列
    for ddl in [
        "CREATE INDEX IF NOT EXISTS idx_alerts_region_expiry ON alerts(region, expiry_date);",
        "CREATE INDEX IF NOT EXISTS idx_rainfall_region_date ON rainfall_data(region, date);",
        "CREATE INDEX IF NOT EXISTS idx_resources_location ON resources(location);",
        "CREATE INDEX IF NOT EXISTS idx_distribution_region_date ON distribution_log(region_id, date_distributed);",
    ] {
        db.execute(sea_orm::Statement::from_string(
            db.get_database_backend(),
            ddl.to_string(),
        ))
        .await?;
    }

    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let stmt = builder.build(schema.create_table_from_entity(entity).if_not_exists());
    db.execute(stmt).await?;
    Ok(())
}
