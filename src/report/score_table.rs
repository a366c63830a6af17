use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::Outcome;

pub const CANDIDATE_COLUMN: &str = "Candidate Name";
pub const TOTAL_COLUMN: &str = "Total Score";

/// 单个候选人的一行评分
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub candidate_name: String,
    /// 与表头中的评分标准一一对应
    pub scores: Vec<f64>,
    pub total: f64,
}

impl ScoreRow {
    /// 从任务结果生成一行，失败结果或缺失的标准记为 0
    pub fn from_outcome(outcome: &Outcome, criteria: &[String]) -> Self {
        Self {
            candidate_name: outcome.candidate_name.clone(),
            scores: criteria.iter().map(|c| outcome.score_for(c)).collect(),
            total: outcome.total(),
        }
    }
}

/// 一个批次的评分表，行顺序与提交顺序一致
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreTable {
    pub criteria: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

impl ScoreTable {
    pub fn new(criteria: Vec<String>) -> Self {
        Self {
            criteria,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ScoreRow) {
        self.rows.push(row);
    }

    /// `[Candidate Name, <criteria...>, Total Score]`
    pub fn header(&self) -> Vec<String> {
        std::iter::once(CANDIDATE_COLUMN.to_string())
            .chain(self.criteria.iter().cloned())
            .chain(std::iter::once(TOTAL_COLUMN.to_string()))
            .collect()
    }

    /// 渲染为 CSV 文本
    pub fn to_csv(&self) -> AppResult<String> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(self.header()).map_err(csv_error)?;

        for row in &self.rows {
            let record = std::iter::once(row.candidate_name.clone())
                .chain(row.scores.iter().map(|score| format_score(*score)))
                .chain(std::iter::once(format_score(row.total)));
            writer.write_record(record).map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV 写入失败: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV 编码失败: {}", e)))
    }
}

/// 整数分数不带小数部分
fn format_score(score: f64) -> String {
    if score.fract() == 0.0 && score.abs() < 1e15 {
        format!("{}", score as i64)
    } else {
        score.to_string()
    }
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV 写入失败: {}", e))
}
