//! 过期浏览记录清理任务
//!
//! 主要由外部 cron 调用清理接口触发；配置了 `views.cleanup_interval_hours`
//! 时也可以在进程内定期运行。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use tracing::{error, info};

use super::{ViewManager, ViewStore};

pub struct ViewCleanupTask {
    store: Arc<dyn ViewStore>,
    interval: StdDuration,
}

impl ViewCleanupTask {
    pub fn new(store: Arc<dyn ViewStore>, interval_hours: u64) -> Self {
        Self {
            store,
            interval: StdDuration::from_secs(interval_hours.max(1) * 60 * 60),
        }
    }

    pub fn interval(&self) -> StdDuration {
        self.interval
    }

    /// 运行一次清理，失败只记录日志
    pub async fn run_once(&self) -> Option<u64> {
        match ViewManager::cleanup_expired(self.store.as_ref()).await {
            Ok(deleted) => Some(deleted),
            Err(e) => {
                error!("View cleanup failed: {}", e);
                None
            }
        }
    }

    /// 启动后台清理任务，每隔 interval 运行一次
    pub fn spawn_background_task(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        info!(
            "View cleanup background task started (interval: {} hours)",
            self.interval.as_secs() / 3600
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                // 第一次 tick 立即返回，启动时先清一次
                ticker.tick().await;
                self.run_once().await;
            }
        })
    }
}
