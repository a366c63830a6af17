//! 评分标准提取流程
//!
//! 无状态：提取职位描述文本后直接请求 LLM，不经过任务队列、结果存储和 worker。

use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::services::{LlmService, TextExtractor};

pub struct CriteriaFlow {
    extractor: Arc<dyn TextExtractor>,
    llm_service: Arc<LlmService>,
}

impl CriteriaFlow {
    pub fn new(extractor: Arc<dyn TextExtractor>, llm_service: Arc<LlmService>) -> Self {
        Self {
            extractor,
            llm_service,
        }
    }

    /// 从职位描述文件中提取评分标准
    pub async fn run(&self, document: Document) -> AppResult<Vec<String>> {
        info!("📄 提取评分标准: {}", document.filename);

        let extractor = self.extractor.clone();
        let text = tokio::task::spawn_blocking(move || extractor.extract(&document))
            .await
            .map_err(|e| AppError::Internal(format!("文本提取任务失败: {}", e)))??;

        let criteria = self.llm_service.extract_criteria(&text).await?;
        info!("✓ 提取到 {} 条评分标准: {:?}", criteria.len(), criteria);
        Ok(criteria)
    }
}
