use crate::summary::DEFAULT_REFRESH_INTERVAL;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://cloudburst.db?mode=rwc";
pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// 常驻：定时刷新并接受按需刷新
    Daemon,
    /// 刷新一次后退出，供 cron 调用
    Once,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub refresh_interval: Duration,
    pub refresh_on_start: bool,
    pub refresh_mode: RefreshMode,
    pub low_stock_threshold: i32,
    pub seed_csv_dir: Option<PathBuf>,
    /// once 模式刷新后把汇总导出到此 CSV
    pub summary_csv_out: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl AppConfig {
    /// 先加载 .env（存在时），再读取进程环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let refresh_interval = match get("REFRESH_INTERVAL_SECS") {
            Some(v) => match v.parse::<u64>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "REFRESH_INTERVAL_SECS",
                        value: v,
                        reason: "expected a positive number of seconds",
                    })
                }
                Ok(secs) => Duration::from_secs(secs),
            },
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let refresh_on_start = match get("REFRESH_ON_START") {
            Some(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue {
                key: "REFRESH_ON_START",
                value: v,
                reason: "expected true or false",
            })?,
            None => true,
        };

        let refresh_mode = match get("REFRESH_MODE").as_deref().map(str::to_ascii_lowercase) {
            None => RefreshMode::Daemon,
            Some(m) if m == "daemon" => RefreshMode::Daemon,
            Some(m) if m == "once" => RefreshMode::Once,
            Some(m) => {
                return Err(ConfigError::InvalidValue {
                    key: "REFRESH_MODE",
                    value: m,
                    reason: "expected daemon or once",
                })
            }
        };

        let low_stock_threshold = match get("LOW_STOCK_THRESHOLD") {
            Some(v) => match v.parse::<i32>() {
                Ok(n) if n >= 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "LOW_STOCK_THRESHOLD",
                        value: v,
                        reason: "expected a non-negative integer",
                    })
                }
            },
            None => DEFAULT_LOW_STOCK_THRESHOLD,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            refresh_interval,
            refresh_on_start,
            refresh_mode,
            low_stock_threshold,
            seed_csv_dir: get("SEED_CSV_DIR").map(PathBuf::from),
            summary_csv_out: get("SUMMARY_CSV_OUT").map(PathBuf::from),
            log_dir: get("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
