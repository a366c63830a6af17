//! 评分执行层
//!
//! - [`ScoringWorker`]：进程内唯一的评分 worker，串行消费任务队列
//! - [`janitor`]：按时长清理结果存储中的旧结果

pub mod janitor;
pub mod scoring_worker;

pub use scoring_worker::{ScoringWorker, WorkerStats};
