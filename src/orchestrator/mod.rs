//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责把一次请求变成对队列和服务的调用，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_coordinator` - 批次协调器
//! - 提取所有简历文本（任何失败都在入队前拒绝）
//! - 为每份简历生成唯一任务 ID 并入队
//! - 有界等待全部结果（成功 / 失败都算完成）
//! - 按提交顺序组装评分表
//!
//! ### `criteria_flow` - 评分标准提取
//! - 提取职位描述文本
//! - 调用 LLM 返回评分标准列表
//! - 不接触队列、结果存储和 worker
//!
//! ## 层次关系
//!
//! ```text
//! server (HTTP)
//!     ↓
//! orchestrator (BatchCoordinator / CriteriaFlow)
//!     ↓
//! queue (JobQueue → ScoringWorker → ResultStore)
//!     ↓
//! services (能力层：text_extractor / llm_service)
//! ```

pub mod batch_coordinator;
pub mod criteria_flow;

// 重新导出主要类型
pub use batch_coordinator::BatchCoordinator;
pub use criteria_flow::CriteriaFlow;
