//! 评分任务队列
//!
//! 无界 FIFO 通道：提交端可以任意克隆，消费端 [`JobReceiver`] 只有一个且不可克隆，
//! 从结构上保证只有一个 worker 消费任务。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::Job;

/// 任务提交端
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Job>,
    depth: Arc<AtomicUsize>,
}

/// 任务消费端，整个进程只有一个
#[derive(Debug)]
pub struct JobReceiver {
    receiver: mpsc::UnboundedReceiver<Job>,
    depth: Arc<AtomicUsize>,
}

impl JobQueue {
    /// 创建队列，返回提交端和唯一的消费端
    pub fn new() -> (JobQueue, JobReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let depth = Arc::new(AtomicUsize::new(0));
        (
            JobQueue {
                sender,
                depth: depth.clone(),
            },
            JobReceiver { receiver, depth },
        )
    }

    /// 提交任务，不阻塞、不因容量拒绝
    ///
    /// 只有消费端已经被丢弃时才会失败。
    pub fn submit(&self, job: Job) -> AppResult<()> {
        let job_id = job.id;
        // 先计数再发送，保证消费端取出时计数不会下溢
        self.depth.fetch_add(1, Ordering::SeqCst);
        if self.sender.send(job).is_err() {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            return Err(AppError::QueueClosed);
        }
        debug!("任务 {} 已入队，当前队列长度: {}", job_id, self.depth());
        Ok(())
    }

    /// 已提交但尚未被取走的任务数
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl JobReceiver {
    /// 取出下一个任务，队列为空时挂起
    ///
    /// 所有提交端都被丢弃且队列已空时返回 `None`。
    pub async fn take(&mut self) -> Option<Job> {
        let job = self.receiver.recv().await?;
        self.depth.fetch_sub(1, Ordering::SeqCst);
        Some(job)
    }
}
