use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 评分任务 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// 生成新的随机任务 ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 一份简历的评分任务
///
/// 创建后不可变。入队后归队列所有，出队后移交给 worker。
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub candidate_name: String,
    pub resume_text: String,
    /// 入队时的评分标准快照，同一批次的任务共享
    pub criteria: Arc<[String]>,
    pub enqueued_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        id: JobId,
        candidate_name: impl Into<String>,
        resume_text: impl Into<String>,
        criteria: Arc<[String]>,
    ) -> Self {
        Self {
            id,
            candidate_name: candidate_name.into(),
            resume_text: resume_text.into(),
            criteria,
            enqueued_at: Utc::now(),
        }
    }
}
