//! 任务队列与结果关联
//!
//! - [`JobQueue`] / [`JobReceiver`]：无界 FIFO，多提交端、单消费端
//! - [`ResultStore`]：任务 ID → 结果，写一次，读任意次，可挂起等待

pub mod job_queue;
pub mod result_store;

pub use job_queue::{JobQueue, JobReceiver};
pub use result_store::ResultStore;
