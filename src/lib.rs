//! # Resume Ranker
//!
//! 一个按评分标准给简历打分的 HTTP 服务，评分通过进程内任务队列串行执行
//!
//! ## 架构设计
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单份文档
//! - `TextExtractor` - PDF / Word 文本提取
//! - `LlmService` - LLM 评分与评分标准提取，实现 `ScoringClient`
//!
//! ### ② 队列层（Queue / Worker）
//! - `queue/` - `JobQueue`（无界 FIFO，单消费者）与 `ResultStore`（写一次、可等待）
//! - `worker/` - 唯一的 `ScoringWorker`，逐个调用评分服务并写入结果
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_coordinator` - 一批简历：提取 → 入队 → 有界等待 → 组装
//! - `orchestrator/criteria_flow` - 无状态的评分标准提取
//!
//! ### ④ 接入层（Server）
//! - `server/` - axum 路由，`app::AppContext` 在启动时构建一次并交给所有请求
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod queue;
pub mod report;
pub mod server;
pub mod services;
pub mod shutdown;
pub mod utils;
pub mod worker;

// 重新导出常用类型
pub use app::{App, AppContext};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Document, Job, JobId, Outcome, OutcomeStatus, ScoreCard};
pub use orchestrator::BatchCoordinator;
pub use queue::{JobQueue, ResultStore};
pub use report::ScoreTable;
pub use services::ScoringClient;
pub use worker::ScoringWorker;
