use crate::commands::AppCommand;
use crate::summary::{RegionSummaryDto, RegionSummaryView, SchedulerHandle};
use chrono::Utc;

pub const HELP: &str = "可用命令: refresh | show <region> | list | export <path.csv> | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleOutcome {
    Reply(String),
    Quit,
}

pub async fn execute(
    cmd: AppCommand,
    scheduler: &SchedulerHandle,
    view: &RegionSummaryView,
) -> ConsoleOutcome {
    let reply = match cmd {
        AppCommand::Refresh => match scheduler.refresh_now().await {
            Ok(report) => format!(
                "✓ 已刷新 {} 个区域, 耗时 {:?}",
                report.regions, report.elapsed
            ),
            Err(e) => format!("✗ 刷新失败: {}", e),
        },
        AppCommand::Show { region } => match view.get(&region).await {
            Ok(Some(row)) => match serde_json::to_string_pretty(&row) {
                Ok(json) => format!("{}\n(数据距今 {} 秒)", json, row.age_secs(Utc::now().timestamp())),
                Err(e) => format!("✗ 序列化失败: {}", e),
            },
            Ok(None) => format!("未找到区域汇总: {}（尚未刷新或区域不存在）", region),
            Err(e) => format!("✗ 查询失败: {}", e),
        },
        AppCommand::List => match view.list().await {
            Ok(snapshot) if snapshot.is_unknown() => {
                "汇总为空：尚未刷新，状态未知".to_string()
            }
            Ok(snapshot) if snapshot.rows.is_empty() => format!(
                "已刷新，暂无区域 (上次刷新 {} 秒前)",
                snapshot
                    .last_refreshed
                    .map_or(0, |ts| (Utc::now().timestamp() - ts).max(0))
            ),
            Ok(snapshot) => {
                let mut lines: Vec<String> = snapshot.rows.iter().map(format_row).collect();
                if let Some(ts) = snapshot.last_refreshed {
                    lines.push(format!(
                        "共 {} 个区域, 上次刷新 {} 秒前",
                        snapshot.rows.len(),
                        (Utc::now().timestamp() - ts).max(0)
                    ));
                }
                lines.join("\n")
            }
            Err(e) => format!("✗ 查询失败: {}", e),
        },
        AppCommand::Export { path } => match view.export_csv(&path).await {
            Ok(rows) => format!("✓ 已导出 {} 行到 {}", rows, path.display()),
            Err(e) => format!("✗ 导出失败: {}", e),
        },
        AppCommand::Help => HELP.to_string(),
        AppCommand::Quit => return ConsoleOutcome::Quit,
        AppCommand::Unknown(msg) if msg.is_empty() => HELP.to_string(),
        AppCommand::Unknown(msg) => format!("{}\n{}", msg, HELP),
    };
    ConsoleOutcome::Reply(reply)
}

fn format_row(row: &RegionSummaryDto) -> String {
    let severity = row
        .highest_active_severity
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    let rain = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |mm| format!("{:.2}", mm));
    format!(
        "{:<20} 风险 {:<8} 预警 {:>2} ({:<8}) 物资 {:>6} 7日分发 {:>6} 最新降雨 {:>7} 7日均值 {:>7}",
        row.region_name,
        row.risk_level.as_deref().unwrap_or("-"),
        row.active_alerts_count,
        severity,
        row.total_resources_available,
        row.distributions_last_7d,
        rain(row.latest_rainfall_mm),
        rain(row.avg_rainfall_7d),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::establish_connection;
    use crate::summary::RefreshScheduler;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn list_tells_unknown_apart_from_empty() {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        let view = Arc::new(RegionSummaryView::new(Arc::new(db)));
        let (handle, join) = RefreshScheduler::new(view.clone(), Duration::from_secs(3600))
            .run_on_start(false)
            .spawn();

        let out = execute(AppCommand::List, &handle, &view).await;
        assert_eq!(
            out,
            ConsoleOutcome::Reply("汇总为空：尚未刷新，状态未知".to_string())
        );
        assert!(matches!(
            execute(AppCommand::Refresh, &handle, &view).await,
            ConsoleOutcome::Reply(text) if text.starts_with("✓ 已刷新 0 个区域")
        ));
        assert!(matches!(
            execute(AppCommand::List, &handle, &view).await,
            ConsoleOutcome::Reply(text) if text.starts_with("已刷新，暂无区域")
        ));
        assert_eq!(
            execute(AppCommand::Quit, &handle, &view).await,
            ConsoleOutcome::Quit
        );

        handle.shutdown().await;
        join.await.unwrap();
    }
}
