//! 评分能力接口
//!
//! worker 只依赖 [`ScoringClient`]，生产环境由 `LlmService` 实现，测试中可替换。

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ScoringError;
use crate::models::ScoreCard;

/// 总分可能出现的字段名
const TOTAL_KEYS: [&str; 4] = ["Total Score", "total_score", "totalScore", "total"];

/// 对一份简历按评分标准打分
#[async_trait]
pub trait ScoringClient: Send + Sync {
    async fn score(
        &self,
        candidate_name: &str,
        resume_text: &str,
        criteria: &[String],
    ) -> Result<ScoreCard, ScoringError>;
}

/// 去掉 LLM 有时包裹在 JSON 外面的 markdown 代码块
pub fn strip_code_fence(content: &str) -> &str {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("valid fence regex")
    });

    fence
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map_or(content.trim(), |m| m.as_str())
}

/// 解析评分响应
///
/// 期望形如 `{"scores": {"Python": 4, ...}, "Total Score": 7}` 的 JSON。
/// 总分依次从顶层、`scores` 内部查找，都没有时取各项标准得分之和。
pub fn parse_score_response(content: &str, criteria: &[String]) -> Result<ScoreCard, ScoringError> {
    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ScoringError::upstream(format!("评分响应不是合法 JSON: {}", e)))?;

    let scores_obj = value
        .get("scores")
        .and_then(Value::as_object)
        .ok_or_else(|| ScoringError::schema("scores"))?;

    let scores: HashMap<String, f64> = scores_obj
        .iter()
        .filter(|(key, _)| !TOTAL_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| as_score(value).map(|score| (key.clone(), score)))
        .collect();

    let total = value
        .as_object()
        .and_then(find_total)
        .or_else(|| find_total(scores_obj))
        .unwrap_or_else(|| {
            criteria
                .iter()
                .filter_map(|criterion| scores.get(criterion))
                .sum()
        });

    Ok(ScoreCard::new(scores, total))
}

fn find_total(obj: &Map<String, Value>) -> Option<f64> {
    TOTAL_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(as_score))
}

/// 数字或数字字符串都视为分数
fn as_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> Vec<String> {
        vec!["Python".to_string(), "AWS".to_string()]
    }

    #[test]
    fn test_parse_top_level_total() {
        let card = parse_score_response(
            r#"{"scores": {"Python": 4, "AWS": 3}, "Total Score": 7}"#,
            &criteria(),
        )
        .unwrap();
        assert_eq!(card.scores["Python"], 4.0);
        assert_eq!(card.scores["AWS"], 3.0);
        assert_eq!(card.total, 7.0);
    }

    #[test]
    fn test_parse_total_inside_scores() {
        let card = parse_score_response(
            r#"{"scores": {"Python": 5, "AWS": "2", "Total Score": 7}}"#,
            &criteria(),
        )
        .unwrap();
        assert_eq!(card.total, 7.0);
        assert!(!card.scores.contains_key("Total Score"));
        assert_eq!(card.scores["AWS"], 2.0);
    }

    #[test]
    fn test_total_falls_back_to_sum() {
        let card =
            parse_score_response(r#"{"scores": {"Python": 1, "AWS": 2}}"#, &criteria()).unwrap();
        assert_eq!(card.total, 3.0);
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let content = "```json\n{\"scores\": {\"Python\": 4}, \"totalScore\": 4}\n```";
        let card = parse_score_response(content, &criteria()).unwrap();
        assert_eq!(card.total, 4.0);
    }

    #[test]
    fn test_missing_scores_is_schema_error() {
        let err = parse_score_response(r#"{"Python": 4}"#, &criteria()).unwrap_err();
        assert!(matches!(err, ScoringError::Schema { .. }));
    }

    #[test]
    fn test_invalid_json_is_upstream_error() {
        let err = parse_score_response("I think Python is 4", &criteria()).unwrap_err();
        assert!(matches!(err, ScoringError::Upstream { .. }));
    }
}
