//! LLM 服务 - 业务能力层
//!
//! 只负责"LLM 判断"能力：给简历打分、从职位描述中提取评分标准。不关心队列和流程。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ScoringError;
use crate::models::ScoreCard;
use crate::services::scoring_client::{parse_score_response, strip_code_fence, ScoringClient};
use crate::utils::logging::truncate_text;

const CRITERIA_SYSTEM_PROMPT: &str =
    "You are an HR expert. Extract ranking criteria from a job description.";
const SCORING_SYSTEM_PROMPT: &str =
    "You are an HR expert who scores resumes based on given criteria.";

/// LLM 服务
///
/// 职责：
/// - 调用 LLM API 给单份简历打分
/// - 调用 LLM API 提取评分标准
/// - 不出现 JobId / 队列
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    request_timeout: Duration,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
            request_timeout: config.scoring_timeout(),
        }
    }

    /// 构建聊天补全请求
    ///
    /// 两类调用都要求模型直接输出 JSON 对象（`response_format: json_object`）。
    fn build_request(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_tokens: u32,
    ) -> Result<CreateChatCompletionRequest, ScoringError> {
        let mut messages = Vec::new();

        if let Some(sys_msg) = system_message {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg)
                .build()
                .map_err(ScoringError::upstream)?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(ScoringError::upstream)?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(max_tokens)
            .response_format(ResponseFormat::JsonObject)
            .build()
            .map_err(ScoringError::upstream)
    }

    /// 通用的 LLM 调用函数
    ///
    /// 其他 LLM 相关功能都基于此函数，调用受 `request_timeout` 限制。
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息（可选）
    /// - `max_tokens`: 最大输出 token 数
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（已去除首尾空白）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: Option<&str>,
        max_tokens: u32,
    ) -> Result<String, ScoringError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

        let request = self.build_request(user_message, system_message, max_tokens)?;

        let response = tokio::time::timeout(self.request_timeout, self.client.chat().create(request))
            .await
            .map_err(|_| {
                warn!("LLM API 调用超时 ({:?})", self.request_timeout);
                ScoringError::Network {
                    reason: format!("LLM API 调用超时 ({}秒)", self.request_timeout.as_secs()),
                }
            })?
            .map_err(|e| {
                warn!("LLM API 调用失败: {}", e);
                ScoringError::upstream(format!("LLM API 调用失败: {}", e))
            })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| ScoringError::upstream("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    /// 从职位描述中提取评分标准
    pub async fn extract_criteria(&self, job_description: &str) -> Result<Vec<String>, ScoringError> {
        let user_message = format!(
            "Extract key ranking criteria from the following job description. \
             Include required skills, certifications, experience, and qualifications. \
             Return your answer as a JSON object with a key 'criteria' that is a JSON array of strings.\n\n\
             Job Description:\n{}",
            job_description
        );

        let response = self
            .send_to_llm(&user_message, Some(CRITERIA_SYSTEM_PROMPT), 1000)
            .await?;
        debug!("LLM 原始标准响应: {}", truncate_text(&response, 200));

        parse_criteria_response(&response)
    }

    /// 构建评分提示词
    fn build_scoring_message(candidate_name: &str, resume_text: &str, criteria: &[String]) -> String {
        let criteria_json = serde_json::to_string(criteria).unwrap_or_else(|_| "[]".to_string());
        format!(
            "Score the following resume for the given criteria. For each criterion, assign a score from 0 to 5. \
             Also, calculate the total score as the sum of individual scores.\n\n\
             Candidate Name: {}\n\n\
             Resume Text:\n{}\n\n\
             Criteria: {}\n\n\
             Return your answer as a JSON object with a key 'scores' that maps each criterion to its score \
             and a key 'Total Score' with the sum.",
            candidate_name, resume_text, criteria_json
        )
    }
}

#[async_trait]
impl ScoringClient for LlmService {
    async fn score(
        &self,
        candidate_name: &str,
        resume_text: &str,
        criteria: &[String],
    ) -> Result<ScoreCard, ScoringError> {
        let user_message = Self::build_scoring_message(candidate_name, resume_text, criteria);
        let response = self
            .send_to_llm(&user_message, Some(SCORING_SYSTEM_PROMPT), 2000)
            .await?;
        debug!(
            "LLM 原始评分响应 [{}]: {}",
            candidate_name,
            truncate_text(&response, 200)
        );

        parse_score_response(&response, criteria)
    }
}

/// 解析标准提取响应 `{"criteria": [...]}`
fn parse_criteria_response(content: &str) -> Result<Vec<String>, ScoringError> {
    let value: Value = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| ScoringError::upstream(format!("标准响应不是合法 JSON: {}", e)))?;

    let items = value
        .get("criteria")
        .and_then(Value::as_array)
        .ok_or_else(|| ScoringError::schema("criteria"))?;

    Ok(items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect())
}
