use serde_json::Value;

use crate::error::InputError;

/// 解析表单中的评分标准
///
/// 只接受 JSON 字符串数组，空数组合法。
pub fn parse_criteria(raw: &str) -> Result<Vec<String>, InputError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| InputError::InvalidCriteria {
        reason: e.to_string(),
    })?;

    let items = value.as_array().ok_or_else(|| InputError::InvalidCriteria {
        reason: "Criteria must be a list of strings.".to_string(),
    })?;

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| InputError::InvalidCriteria {
                    reason: format!("criteria[{}] is not a string", idx),
                })
        })
        .collect()
}
