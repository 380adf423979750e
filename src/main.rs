use chrono::Local;
use cloudburst::app_service::bootstrap;
use cloudburst::commands::console::{execute, ConsoleOutcome, HELP};
use cloudburst::commands::AppCommand;
use cloudburst::config::{AppConfig, RefreshMode};
use cloudburst::summary::RefreshScheduler;
use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config)?;
    info!("配置已加载: {:?}", config);

    let ctx = bootstrap(&config).await?;

    if config.refresh_mode == RefreshMode::Once {
        let report = ctx.view.refresh().await?;
        println!(
            "Refresh: OK ({} regions, {:?})",
            report.regions, report.elapsed
        );
        if let Some(path) = &config.summary_csv_out {
            let rows = ctx.view.export_csv(path).await?;
            println!("Export: OK ({} rows -> {})", rows, path.display());
        }
        return Ok(());
    }

    let (scheduler, join) = RefreshScheduler::new(ctx.view.clone(), config.refresh_interval)
        .run_on_start(config.refresh_on_start)
        .spawn();

    println!("区域汇总服务已启动, 刷新周期 {:?}", config.refresh_interval);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    // stdin 关闭（例如后台运行）时只保留定时刷新，等待 Ctrl-C
                    Ok(None) => {
                        let _ = tokio::signal::ctrl_c().await;
                        break;
                    }
                    Err(e) => {
                        error!("读取控制台输入失败: {}", e);
                        break;
                    }
                };
                let cmd = line
                    .parse::<AppCommand>()
                    .unwrap_or_else(|_| AppCommand::Unknown(String::new()));
                match execute(cmd, &scheduler, &ctx.view).await {
                    ConsoleOutcome::Reply(text) => println!("{}", text),
                    ConsoleOutcome::Quit => break,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("收到退出信号, 等待刷新任务结束");
    scheduler.shutdown().await;
    join.await?;
    Ok(())
}

fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    std::fs::create_dir_all(&config.log_dir)?;
    let log_path = config.log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(log_path)?;
    // RUST_LOG 最后解析，覆盖默认过滤
    env_logger::Builder::new()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter_level(log::LevelFilter::Warn)
        .filter_module("cloudburst", log::LevelFilter::Info)
        .filter_module("sqlx", log::LevelFilter::Error)
        .filter_module("sea_orm", log::LevelFilter::Error)
        .parse_default_env()
        .init();
    Ok(())
}
