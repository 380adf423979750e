use chrono::{Days, NaiveDate};
use cloudburst::storage::entity::{region_summary, DistributionRecord, Region};
use cloudburst::storage::establish_connection;
use cloudburst::storage::repository::{
    AlertRepository, DistributionRepository, NewAlert, NewDistribution, NewRainfall, NewRegion,
    NewResource, RainfallRepository, RegionRepository, ResourceRepository, SummaryRepository,
};
use cloudburst::storage::vocab::{RiskLevel, Severity};
use cloudburst::storage::StorageError;
use cloudburst::summary::{AsOf, RegionSummaryDto, RegionSummaryView, SummaryError};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Statement};
use std::sync::Arc;

const THRESHOLD: i32 = 100;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
}

fn days_ago(n: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(n)).unwrap()
}

fn as_of(refreshed_at: i64) -> AsOf {
    AsOf {
        today: today(),
        refreshed_at,
    }
}

async fn setup() -> (Arc<DatabaseConnection>, RegionSummaryView) {
    let db = Arc::new(establish_connection("sqlite::memory:").await.unwrap());
    let view = RegionSummaryView::new(db.clone());
    (db, view)
}

async fn add_region(db: &DatabaseConnection, name: &str, population: i64) -> i32 {
    RegionRepository::create(
        db,
        NewRegion {
            region_name: name.to_string(),
            population: Some(population),
            risk_level: RiskLevel::High,
            warning_status: true,
            report_date: Some(today()),
        },
    )
    .await
    .unwrap()
}

async fn add_alert(db: &DatabaseConnection, region: &str, severity: &str, expiry: NaiveDate) {
    AlertRepository::issue(
        db,
        NewAlert {
            region: region.to_string(),
            alert_message: format!("{severity} cloudburst alert"),
            severity: severity.to_string(),
            date_issued: days_ago(3),
            expiry_date: expiry,
        },
    )
    .await
    .unwrap();
}

async fn add_rain(db: &DatabaseConnection, region: &str, date: NaiveDate, mm: f64) {
    RainfallRepository::record(
        db,
        NewRainfall {
            region: region.to_string(),
            date,
            rainfall_mm: mm,
            temperature_c: Some(18.5),
            humidity: Some(92.0),
        },
    )
    .await
    .unwrap();
}

async fn add_resource(db: &DatabaseConnection, location: &str, quantity: i32) -> i32 {
    ResourceRepository::create(
        db,
        NewResource {
            resource_type: "Relief Kits".to_string(),
            quantity_available: quantity,
            location: location.to_string(),
            last_restocked: Some(days_ago(10)),
        },
        THRESHOLD,
    )
    .await
    .unwrap()
}

fn without_timestamp(rows: Vec<region_summary::Model>) -> Vec<region_summary::Model> {
    rows.into_iter()
        .map(|mut r| {
            r.last_refreshed = 0;
            r
        })
        .collect()
}

#[tokio::test]
async fn end_to_end_scenario() {
    let (db, view) = setup().await;
    let region_id = add_region(&db, "Test Region", 1000).await;
    add_alert(&db, "Test Region", "Critical", days_ago(0)).await;
    let resource_id = add_resource(&db, "Test Region", 200).await;
    DistributionRepository::record_distribution(
        &db,
        NewDistribution {
            region_id,
            resource_id,
            quantity_sent: 50,
            date_distributed: days_ago(2),
            distributed_by: Some("NDRF".to_string()),
        },
        THRESHOLD,
    )
    .await
    .unwrap();
    add_rain(&db, "Test Region", days_ago(1), 100.0).await;

    let report = view.refresh_as_of(as_of(1_721_000_000)).await.unwrap();
    assert_eq!(report.regions, 1);

    let row = view.get("Test Region").await.unwrap().unwrap();
    assert_eq!(row.population, Some(1000));
    assert_eq!(row.active_alerts_count, 1);
    assert_eq!(row.highest_active_severity, Some(Severity::Critical));
    assert_eq!(row.total_resources_available, 150);
    assert_eq!(row.distributions_last_7d, 50);
    assert_eq!(row.latest_rainfall_mm, Some(100.0));
    assert_eq!(row.avg_rainfall_7d, Some(100.0));
    assert_eq!(row.last_refreshed, 1_721_000_000);
}

#[tokio::test]
async fn refresh_is_idempotent_apart_from_timestamp() {
    let (db, view) = setup().await;
    add_region(&db, "Kullu", 437_000).await;
    add_region(&db, "Mandi", 999_000).await;
    add_alert(&db, "Kullu", "High", days_ago(0)).await;
    add_resource(&db, "Mandi", 75).await;
    add_rain(&db, "Mandi", days_ago(3), 42.25).await;

    view.refresh_as_of(as_of(100)).await.unwrap();
    let first = SummaryRepository::list_all(db.as_ref()).await.unwrap();
    view.refresh_as_of(as_of(200)).await.unwrap();
    let second = SummaryRepository::list_all(db.as_ref()).await.unwrap();

    assert!(first.iter().all(|r| r.last_refreshed == 100));
    assert!(second.iter().all(|r| r.last_refreshed == 200));
    assert_eq!(without_timestamp(first), without_timestamp(second));
}

#[tokio::test]
async fn every_region_gets_exactly_one_row() {
    let (db, view) = setup().await;
    for name in ["Chamba", "Kinnaur", "Lahaul"] {
        add_region(&db, name, 10_000).await;
    }
    add_alert(&db, "Nowhere", "Critical", days_ago(0)).await;

    view.refresh_as_of(as_of(1)).await.unwrap();
    let snapshot = view.list().await.unwrap();
    let names: Vec<&str> = snapshot.rows.iter().map(|r| r.region_name.as_str()).collect();
    assert_eq!(names, vec!["Chamba", "Kinnaur", "Lahaul"]);
    assert_eq!(snapshot.last_refreshed, Some(1));
    for row in &snapshot.rows {
        assert_eq!(row.active_alerts_count, 0);
        assert_eq!(row.highest_active_severity, None);
        assert_eq!(row.total_resources_available, 0);
        assert_eq!(row.distributions_last_7d, 0);
        assert_eq!(row.latest_rainfall_mm, None);
        assert_eq!(row.avg_rainfall_7d, None);
    }
}

#[tokio::test]
async fn removed_region_does_not_survive_refresh() {
    let (db, view) = setup().await;
    add_region(&db, "Kullu", 1).await;
    let gone = add_region(&db, "Old District", 1).await;
    view.refresh_as_of(as_of(1)).await.unwrap();
    assert!(view.get("Old District").await.unwrap().is_some());

    Region::delete_by_id(gone).exec(db.as_ref()).await.unwrap();
    view.refresh_as_of(as_of(2)).await.unwrap();
    assert!(view.get("Old District").await.unwrap().is_none());
    assert_eq!(view.list().await.unwrap().rows.len(), 1);
}

#[tokio::test]
async fn severity_ranking_and_expiry_boundary() {
    let (db, view) = setup().await;
    add_region(&db, "Kullu", 1).await;
    add_region(&db, "Shimla", 1).await;
    add_alert(&db, "Kullu", "Low", days_ago(0)).await;
    add_alert(&db, "Kullu", "High", today().checked_add_days(Days::new(2)).unwrap()).await;
    add_alert(&db, "Kullu", "Critical", days_ago(1)).await;
    add_alert(&db, "Shimla", "Critical", days_ago(1)).await;
    add_alert(&db, "Shimla", "High", days_ago(4)).await;

    view.refresh_as_of(as_of(1)).await.unwrap();

    let kullu = view.get("Kullu").await.unwrap().unwrap();
    assert_eq!(kullu.active_alerts_count, 2);
    assert_eq!(kullu.highest_active_severity, Some(Severity::High));

    let shimla = view.get("Shimla").await.unwrap().unwrap();
    assert_eq!(shimla.active_alerts_count, 0);
    assert_eq!(shimla.highest_active_severity, None);
}

#[tokio::test]
async fn rainfall_window_is_inclusive_of_day_seven() {
    let (db, view) = setup().await;
    add_region(&db, "Mandi", 1).await;
    add_region(&db, "Solan", 1).await;
    add_rain(&db, "Mandi", days_ago(0), 10.0).await;
    add_rain(&db, "Mandi", days_ago(6), 20.0).await;
    add_rain(&db, "Mandi", days_ago(8), 30.0).await;
    add_rain(&db, "Solan", days_ago(7), 40.0).await;
    add_rain(&db, "Solan", days_ago(8), 60.0).await;

    view.refresh_as_of(as_of(1)).await.unwrap();

    let mandi = view.get("Mandi").await.unwrap().unwrap();
    assert_eq!(mandi.avg_rainfall_7d, Some(15.0));
    assert_eq!(mandi.latest_rainfall_mm, Some(10.0));

    let solan = view.get("Solan").await.unwrap().unwrap();
    assert_eq!(solan.avg_rainfall_7d, Some(40.0));
    assert_eq!(solan.latest_rainfall_mm, Some(40.0));
}

#[tokio::test]
async fn distribution_debits_stock_in_same_transaction() {
    let (db, _view) = setup().await;
    let region_id = add_region(&db, "Kangra", 1).await;
    let resource_id = add_resource(&db, "Kangra", 100).await;

    let receipt = DistributionRepository::record_distribution(
        &db,
        NewDistribution {
            region_id,
            resource_id,
            quantity_sent: 50,
            date_distributed: today(),
            distributed_by: None,
        },
        THRESHOLD,
    )
    .await
    .unwrap();
    assert_eq!(receipt.remaining_quantity, 50);
    assert_eq!(receipt.resource_status, "Low Stock");

    let stock = ResourceRepository::find(&db, resource_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity_available, 50);
    assert_eq!(stock.status, "Low Stock");

    let logs = DistributionRepository::for_region(&db, region_id)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].log_id, receipt.log_id);

    // 耗尽
    let receipt = DistributionRepository::record_distribution(
        &db,
        NewDistribution {
            region_id,
            resource_id,
            quantity_sent: 50,
            date_distributed: today(),
            distributed_by: None,
        },
        THRESHOLD,
    )
    .await
    .unwrap();
    assert_eq!(receipt.remaining_quantity, 0);
    assert_eq!(receipt.resource_status, "Depleted");
}

#[tokio::test]
async fn rejected_distribution_writes_nothing() {
    let (db, _view) = setup().await;
    let region_id = add_region(&db, "Kangra", 1).await;
    let resource_id = add_resource(&db, "Kangra", 30).await;

    let over = DistributionRepository::record_distribution(
        &db,
        NewDistribution {
            region_id,
            resource_id,
            quantity_sent: 31,
            date_distributed: today(),
            distributed_by: None,
        },
        THRESHOLD,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        over,
        StorageError::InsufficientStock {
            available: 30,
            requested: 31,
            ..
        }
    ));

    let missing_region = DistributionRepository::record_distribution(
        &db,
        NewDistribution {
            region_id: region_id + 99,
            resource_id,
            quantity_sent: 5,
            date_distributed: today(),
            distributed_by: None,
        },
        THRESHOLD,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        missing_region,
        StorageError::NotFound { entity: "region", .. }
    ));

    let zero = DistributionRepository::record_distribution(
        &db,
        NewDistribution {
            region_id,
            resource_id,
            quantity_sent: 0,
            date_distributed: today(),
            distributed_by: None,
        },
        THRESHOLD,
    )
    .await
    .unwrap_err();
    assert!(matches!(zero, StorageError::InvalidQuantity(0)));

    assert_eq!(DistributionRecord::find().count(db.as_ref()).await.unwrap(), 0);
    let stock = ResourceRepository::find(&db, resource_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stock.quantity_available, 30);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_summary() {
    let (db, view) = setup().await;
    add_region(&db, "Kullu", 1).await;
    add_rain(&db, "Kullu", days_ago(1), 12.0).await;
    view.refresh_as_of(as_of(10)).await.unwrap();

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DROP TABLE rainfall_data;".to_string(),
    ))
    .await
    .unwrap();

    let err = view.refresh_as_of(as_of(20)).await.unwrap_err();
    assert!(matches!(err, SummaryError::Db(_)));

    let snapshot = view.list().await.unwrap();
    assert_eq!(snapshot.last_refreshed, Some(10));
    assert_eq!(snapshot.rows[0].latest_rainfall_mm, Some(12.0));
}

#[tokio::test]
async fn refresh_over_no_regions_is_known_and_empty() {
    let (_db, view) = setup().await;
    assert!(view.list().await.unwrap().is_unknown());

    let report = view.refresh_as_of(as_of(55)).await.unwrap();
    assert_eq!(report.regions, 0);

    let snapshot = view.list().await.unwrap();
    assert!(!snapshot.is_unknown());
    assert!(snapshot.rows.is_empty());
    assert_eq!(snapshot.last_refreshed, Some(55));
}

#[tokio::test]
async fn export_writes_current_summary_as_csv() {
    let (db, view) = setup().await;
    add_region(&db, "Kullu", 437_000).await;
    add_region(&db, "Mandi", 999_000).await;
    add_alert(&db, "Kullu", "Critical", days_ago(0)).await;
    add_resource(&db, "Mandi", 75).await;
    add_rain(&db, "Kullu", days_ago(2), 33.75).await;
    view.refresh_as_of(as_of(900)).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("region_summary.csv");
    let written = view.export_csv(&path).await.unwrap();
    assert_eq!(written, 2);

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let exported: Vec<RegionSummaryDto> = reader
        .deserialize()
        .collect::<Result<_, csv::Error>>()
        .unwrap();
    assert_eq!(exported, view.list().await.unwrap().rows);
    assert_eq!(exported[0].highest_active_severity, Some(Severity::Critical));
    assert_eq!(exported[1].latest_rainfall_mm, None);
}
