use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::models::{Job, Outcome};
use crate::queue::{JobReceiver, ResultStore};
use crate::services::ScoringClient;

/// worker 运行统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
}

/// 评分 worker
///
/// 队列的唯一消费者：逐个取出任务、调用评分服务、写入结果。
/// 单个任务失败（网络、上游、格式、超时、panic）只会得到 Failed 结果，不重试也不重新入队，
/// 循环继续。
pub struct ScoringWorker {
    receiver: JobReceiver,
    client: Arc<dyn ScoringClient>,
    store: ResultStore,
    scoring_timeout: Duration,
}

impl ScoringWorker {
    pub fn new(
        receiver: JobReceiver,
        client: Arc<dyn ScoringClient>,
        store: ResultStore,
        scoring_timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            client,
            store,
            scoring_timeout,
        }
    }

    /// 在 tokio 运行时上启动 worker
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<WorkerStats> {
        tokio::spawn(self.run(shutdown))
    }

    /// worker 主循环，直到收到关闭信号或队列关闭
    pub async fn run(mut self, shutdown: CancellationToken) -> WorkerStats {
        info!("🚀 评分 worker 已启动");
        let mut stats = WorkerStats::default();

        loop {
            let job = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("🛑 收到关闭信号，评分 worker 退出");
                    break;
                }
                job = self.receiver.take() => match job {
                    Some(job) => job,
                    None => {
                        info!("任务队列已关闭，评分 worker 退出");
                        break;
                    }
                },
            };

            let outcome = self.process(&job).await;

            stats.processed += 1;
            if outcome.is_completed() {
                stats.completed += 1;
            } else {
                stats.failed += 1;
            }

            self.store.put(job.id, outcome);
        }

        info!(
            "📊 评分 worker 统计: 处理 {} 个, 成功 {} 个, 失败 {} 个",
            stats.processed, stats.completed, stats.failed
        );
        stats
    }

    /// 处理单个任务，总是返回一个结果
    async fn process(&self, job: &Job) -> Outcome {
        info!("[任务 {}] 🤖 开始评分: {}", job.id, job.candidate_name);

        let call = AssertUnwindSafe(self.client.score(
            &job.candidate_name,
            &job.resume_text,
            &job.criteria,
        ))
        .catch_unwind();

        match tokio::time::timeout(self.scoring_timeout, call).await {
            Ok(Ok(Ok(score_card))) => {
                info!(
                    "[任务 {}] ✓ 评分完成: {} 总分 {}",
                    job.id, job.candidate_name, score_card.total
                );
                Outcome::completed(job, score_card)
            }
            Ok(Ok(Err(e))) => {
                error!("[任务 {}] ❌ 评分失败: {}", job.id, e);
                Outcome::failed(job, e.to_string())
            }
            Ok(Err(_)) => {
                error!("[任务 {}] ❌ 评分调用 panic", job.id);
                Outcome::failed(job, "评分调用 panic")
            }
            Err(_) => {
                warn!(
                    "[任务 {}] ⚠️ 评分超时 ({}秒)",
                    job.id,
                    self.scoring_timeout.as_secs()
                );
                Outcome::failed(
                    job,
                    format!("评分超时 ({}秒)", self.scoring_timeout.as_secs()),
                )
            }
        }
    }
}
