#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use resume_ranker::error::{ExtractError, ScoringError};
use resume_ranker::services::{LlmService, TextExtractor};
use resume_ranker::{Config, Document, ScoreCard, ScoringClient};

/// 把上传内容当作 UTF-8 纯文本，`.bin` 视为不支持的格式
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, document: &Document) -> Result<String, ExtractError> {
        if document.extension().as_deref() == Some("bin") {
            return Err(ExtractError::UnsupportedFormat {
                filename: document.filename.clone(),
            });
        }
        Ok(String::from_utf8_lossy(&document.bytes).into_owned())
    }
}

/// 单个候选人的预设行为
#[derive(Clone)]
pub enum Script {
    Scores(Vec<(&'static str, f64)>),
    Fail,
    Hang,
}

/// 按候选人名返回预设结果，并记录调用顺序
#[derive(Default)]
pub struct ScriptedClient {
    scripts: HashMap<String, Script>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, candidate: &str, script: Script) -> Self {
        self.scripts.insert(candidate.to_string(), script);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoringClient for ScriptedClient {
    async fn score(
        &self,
        candidate_name: &str,
        _resume_text: &str,
        criteria: &[String],
    ) -> Result<ScoreCard, ScoringError> {
        self.calls.lock().unwrap().push(candidate_name.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.scripts.get(candidate_name) {
            Some(Script::Scores(pairs)) => {
                let scores: HashMap<String, f64> =
                    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                let total = scores.values().sum();
                Ok(ScoreCard::new(scores, total))
            }
            Some(Script::Fail) => Err(ScoringError::upstream("scripted failure")),
            Some(Script::Hang) => std::future::pending().await,
            // 未配置的候选人每项 1 分
            None => {
                let scores: HashMap<String, f64> =
                    criteria.iter().map(|c| (c.clone(), 1.0)).collect();
                let total = scores.len() as f64;
                Ok(ScoreCard::new(scores, total))
            }
        }
    }
}

pub fn test_config() -> Config {
    Config {
        llm_api_key: "sk-test".to_string(),
        scoring_timeout_secs: 30,
        batch_deadline_secs: 5,
        ..Config::default()
    }
}

pub fn test_llm_service(config: &Config) -> Arc<LlmService> {
    Arc::new(LlmService::new(config))
}

pub fn text_doc(name: &str, body: &str) -> Document {
    Document::new(name, body.as_bytes().to_vec())
}

pub fn criteria(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
