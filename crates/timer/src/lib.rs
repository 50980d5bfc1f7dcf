// Timer: 按cron调度的榜单快照重算
// - 每次触发重算全部(scope, time_window)分区并整体替换快照
// - 启动时先算一轮，新部署立即有数据可读
use chrono::Utc;
use cron::Schedule;
use server::services::Services;
use std::{str::FromStr, sync::Arc, time::Duration};
use tokio::{task, time::sleep_until};
use tracing::{error, info};

#[derive(Clone)]
pub struct Timer {
    pub schedule: String,
    pub services: Services,
}

impl Timer {
    // "0 */10 * * * *": 每10分钟重算一次
    pub fn new(schedule: Option<String>, services: Services) -> Self {
        match schedule {
            Some(schedule) => Timer { schedule, services },
            None => Timer {
                schedule: "0 */10 * * * *".to_string(),
                services,
            },
        }
    }

    pub async fn run(self: Arc<Self>) {
        info!("⏳ Timer: leaderboard recompute scheduled at \"{}\".", self.schedule);

        let schedule = match Schedule::from_str(&self.schedule) {
            Ok(schedule) => schedule,
            Err(e) => {
                error!("🔴 无法解析cron表达式 {}: {}", self.schedule, e);
                return;
            }
        };

        // 启动轮
        self.recompute_snapshots().await;

        loop {
            let now = Utc::now();
            let next_run_time = match schedule.upcoming(Utc).next() {
                Some(next) => next,
                None => {
                    error!("🔴 cron表达式没有下一次触发时间，Timer退出");
                    return;
                }
            };

            let duration_until_next_run = (next_run_time - now).to_std().unwrap_or(Duration::from_secs(0));

            sleep_until(tokio::time::Instant::now() + duration_until_next_run).await;

            let this = Arc::clone(&self);
            let handle = task::spawn(async move {
                this.recompute_snapshots().await;
            });
            if let Err(e) = handle.await {
                error!("🔴 榜单重算任务异常退出: {}", e);
            }
        }
    }

    async fn recompute_snapshots(&self) {
        let as_of = Utc::now();

        match self.services.leaderboard.recompute_all(as_of).await {
            Ok(_) => info!("✅ 榜单重算轮次完成: as_of={}", as_of),
            Err(e) => error!("❌ 榜单重算失败: {}", e),
        }
    }
}
