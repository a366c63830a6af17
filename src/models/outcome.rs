use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::job::{Job, JobId};

/// 评分结果：每项标准的得分和总分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub scores: HashMap<String, f64>,
    pub total: f64,
}

impl ScoreCard {
    pub fn new(scores: HashMap<String, f64>, total: f64) -> Self {
        Self { scores, total }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Completed => write!(f, "completed"),
            OutcomeStatus::Failed => write!(f, "failed"),
        }
    }
}

/// 任务的最终结果，每个任务 ID 只写入一次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub job_id: JobId,
    pub status: OutcomeStatus,
    pub candidate_name: String,
    pub score_card: Option<ScoreCard>,
    pub error: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl Outcome {
    pub fn completed(job: &Job, score_card: ScoreCard) -> Self {
        Self {
            job_id: job.id,
            status: OutcomeStatus::Completed,
            candidate_name: job.candidate_name.clone(),
            score_card: Some(score_card),
            error: None,
            finished_at: Utc::now(),
        }
    }

    pub fn failed(job: &Job, error: impl Into<String>) -> Self {
        Self {
            job_id: job.id,
            status: OutcomeStatus::Failed,
            candidate_name: job.candidate_name.clone(),
            score_card: None,
            error: Some(error.into()),
            finished_at: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == OutcomeStatus::Completed
    }

    /// 某项标准的得分；失败或缺失时为 0
    pub fn score_for(&self, criterion: &str) -> f64 {
        self.score_card
            .as_ref()
            .and_then(|card| card.scores.get(criterion).copied())
            .unwrap_or(0.0)
    }

    /// 总分；失败时为 0
    pub fn total(&self) -> f64 {
        self.score_card.as_ref().map_or(0.0, |card| card.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn job() -> Job {
        Job::new(
            JobId::new(),
            "jane_doe",
            "resume",
            Arc::from(vec!["Python".to_string(), "AWS".to_string()]),
        )
    }

    #[test]
    fn test_completed_outcome_reads_scores() {
        let card = ScoreCard::new(HashMap::from([("Python".to_string(), 4.0)]), 4.0);
        let outcome = Outcome::completed(&job(), card);
        assert!(outcome.is_completed());
        assert_eq!(outcome.score_for("Python"), 4.0);
        assert_eq!(outcome.score_for("AWS"), 0.0);
        assert_eq!(outcome.total(), 4.0);
        assert_eq!(outcome.candidate_name, "jane_doe");
    }

    #[test]
    fn test_failed_outcome_is_zero_filled() {
        let outcome = Outcome::failed(&job(), "boom");
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(outcome.score_for("Python"), 0.0);
        assert_eq!(outcome.total(), 0.0);
        assert_eq!(outcome.error.as_deref(), Some("boom"));
    }
}
