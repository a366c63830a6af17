use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::queue::ResultStore;

/// 定期清理结果存储中完成时间超过 `retention` 的结果
///
/// 批次超时后才写入的结果没有人再读取，靠这里回收。
pub fn spawn_result_janitor(
    store: ResultStore,
    retention: Duration,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // 第一次 tick 立即完成，跳过
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = store.evict_finished_older_than(retention);
                    if evicted > 0 {
                        info!("🧹 已清理 {} 个过期评分结果，剩余 {} 个", evicted, store.len());
                    } else {
                        debug!("结果清理: 无过期结果");
                    }
                }
            }
        }
    })
}
