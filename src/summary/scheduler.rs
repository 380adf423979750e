use crate::summary::model::{RefreshReport, SummaryError};
use crate::summary::view::RegionSummaryView;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(15 * 60);

pub enum SchedulerCommand {
    RefreshNow {
        reply: oneshot::Sender<Result<RefreshReport, SummaryError>>,
    },
    Shutdown,
}

/// 周期刷新协调器。所有定时与按需刷新都在同一个任务里串行执行
pub struct RefreshScheduler {
    view: Arc<RegionSummaryView>,
    interval: Duration,
    run_on_start: bool,
}

impl RefreshScheduler {
    pub fn new(view: Arc<RegionSummaryView>, interval: Duration) -> Self {
        Self {
            view,
            interval: interval.max(Duration::from_secs(1)),
            run_on_start: true,
        }
    }

    pub fn run_on_start(mut self, run_on_start: bool) -> Self {
        self.run_on_start = run_on_start;
        self
    }

    pub fn spawn(self) -> (SchedulerHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let join = tokio::spawn(self.run(rx));
        (SchedulerHandle { tx }, join)
    }

    async fn run(self, mut rx: mpsc::Receiver<SchedulerCommand>) {
        let first = if self.run_on_start {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = interval_at(first, self.interval);
        // 上一次刷新超时不补跑，顺延到下一个周期
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("区域汇总刷新任务已启动, 周期 {:?}", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.view.refresh().await {
                        error!("定时刷新区域汇总失败: {}", e);
                    }
                }
                cmd = rx.recv() => match cmd {
                    Some(SchedulerCommand::RefreshNow { reply }) => {
                        let result = self.view.refresh().await;
                        if let Err(e) = &result {
                            warn!("按需刷新区域汇总失败: {}", e);
                        }
                        // 按需刷新后重新计时
                        ticker.reset();
                        let _ = reply.send(result);
                    }
                    Some(SchedulerCommand::Shutdown) | None => break,
                },
            }
        }

        info!("区域汇总刷新任务已停止");
    }
}

#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<SchedulerCommand>,
}

impl SchedulerHandle {
    pub async fn refresh_now(&self) -> Result<RefreshReport, SummaryError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(SchedulerCommand::RefreshNow { reply })
            .await
            .map_err(|_| SummaryError::SchedulerStopped)?;
        rx.await.map_err(|_| SummaryError::SchedulerStopped)?
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(SchedulerCommand::Shutdown).await;
    }
}
