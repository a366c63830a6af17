//! 批次协调器 - 编排层
//!
//! ## 职责
//!
//! 把一次请求中的 N 份简历变成一张同步返回的评分表：
//!
//! 1. **文本提取**：所有文件先提取完，任何一个失败都直接拒绝，不创建任务
//! 2. **入队**：每份简历一个任务，生成唯一 ID，共享同一份评分标准快照
//! 3. **有界等待**：等待所有 ID 出现结果（成功或失败都算完成），超过截止时间整批失败
//! 4. **组装**：按提交顺序每个任务一行，失败的任务整行记 0
//!
//! 超时不会取消正在执行的任务，迟到的结果照常写入结果存储，由清理任务回收。

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult, InputError};
use crate::models::{Document, Job, JobId, Outcome};
use crate::queue::{JobQueue, ResultStore};
use crate::report::{ScoreRow, ScoreTable};
use crate::services::TextExtractor;

/// 批次协调器
pub struct BatchCoordinator {
    queue: JobQueue,
    store: ResultStore,
    extractor: Arc<dyn TextExtractor>,
    deadline: Duration,
}

/// 已提取文本、等待入队的简历
struct PreparedDocument {
    candidate_name: String,
    resume_text: String,
}

impl BatchCoordinator {
    pub fn new(
        queue: JobQueue,
        store: ResultStore,
        extractor: Arc<dyn TextExtractor>,
        deadline: Duration,
    ) -> Self {
        Self {
            queue,
            store,
            extractor,
            deadline,
        }
    }

    /// 为一批简历评分并返回评分表
    ///
    /// # 错误
    /// - 没有文件 / 文件无法解析：输入错误，没有任务入队
    /// - 截止时间内未全部完成：`AppError::BatchTimeout`，不返回任何行
    pub async fn score_batch(
        &self,
        criteria: Vec<String>,
        documents: Vec<Document>,
    ) -> AppResult<ScoreTable> {
        if documents.is_empty() {
            return Err(InputError::NoDocuments.into());
        }

        let total = documents.len();
        log_batch_start(total, &criteria);

        let prepared = self.prepare_documents(documents).await?;

        let snapshot: Arc<[String]> = Arc::from(criteria.as_slice());
        let job_ids = self.enqueue_all(prepared, &snapshot)?;

        let outcomes = self.wait_for_all(&job_ids).await?;

        let mut table = ScoreTable::new(criteria);
        for outcome in &outcomes {
            let row = ScoreRow::from_outcome(outcome, &snapshot);
            table.push(row);
        }

        log_batch_complete(&outcomes);
        Ok(table)
    }

    /// 依次提取所有文件的文本（在阻塞线程池中执行）
    async fn prepare_documents(&self, documents: Vec<Document>) -> AppResult<Vec<PreparedDocument>> {
        let extractor = self.extractor.clone();

        let prepared = tokio::task::spawn_blocking(move || {
            documents
                .iter()
                .map(|document| -> AppResult<PreparedDocument> {
                    let resume_text = extractor.extract(document)?;
                    Ok(PreparedDocument {
                        candidate_name: document.candidate_name(),
                        resume_text,
                    })
                })
                .collect::<AppResult<Vec<_>>>()
        })
        .await
        .map_err(|e| AppError::Internal(format!("文本提取任务失败: {}", e)))??;

        Ok(prepared)
    }

    /// 为每份简历创建任务并入队，返回按提交顺序排列的任务 ID
    fn enqueue_all(
        &self,
        prepared: Vec<PreparedDocument>,
        criteria: &Arc<[String]>,
    ) -> AppResult<Vec<JobId>> {
        let mut job_ids = Vec::with_capacity(prepared.len());

        for document in prepared {
            let job_id = self.fresh_job_id();
            let job = Job::new(
                job_id,
                document.candidate_name,
                document.resume_text,
                criteria.clone(),
            );
            self.queue.submit(job)?;
            info!("📤 任务已入队: {}", job_id);
            job_ids.push(job_id);
        }

        Ok(job_ids)
    }

    /// 生成一个在结果存储中尚未出现过的任务 ID
    fn fresh_job_id(&self) -> JobId {
        loop {
            let id = JobId::new();
            if self.store.register(id) {
                return id;
            }
            warn!("⚠️ 任务 ID {} 冲突，重新生成", id);
        }
    }

    /// 等待所有任务出结果，截止时间从入队完成开始计算
    async fn wait_for_all(&self, job_ids: &[JobId]) -> AppResult<Vec<Arc<Outcome>>> {
        let deadline = Instant::now() + self.deadline;
        let waits = job_ids.iter().map(|id| self.store.wait_for(*id));

        match tokio::time::timeout_at(deadline, join_all(waits)).await {
            Ok(outcomes) => outcomes
                .into_iter()
                .zip(job_ids)
                .map(|(outcome, id)| {
                    outcome.ok_or_else(|| AppError::Internal(format!("任务 {} 的结果槽已被移除", id)))
                })
                .collect(),
            Err(_) => {
                let pending = job_ids
                    .iter()
                    .filter(|id| self.store.get(id).is_none())
                    .count();
                error!(
                    "❌ 等待评分结果超时: {}/{} 个任务未完成",
                    pending,
                    job_ids.len()
                );
                Err(AppError::BatchTimeout {
                    pending,
                    total: job_ids.len(),
                    deadline_secs: self.deadline.as_secs(),
                })
            }
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_batch_start(total: usize, criteria: &[String]) {
    info!("{}", "=".repeat(60));
    info!("📦 开始处理评分批次: {} 份简历", total);
    info!("📋 评分标准: {:?}", criteria);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(outcomes: &[Arc<Outcome>]) {
    let completed = outcomes.iter().filter(|o| o.is_completed()).count();
    info!("{}", "─".repeat(60));
    info!("✓ 批次完成: 成功 {}/{}", completed, outcomes.len());
    if completed < outcomes.len() {
        warn!("⚠️ {} 份简历评分失败，已按 0 分记录", outcomes.len() - completed);
    }
    info!("{}", "─".repeat(60));
}
