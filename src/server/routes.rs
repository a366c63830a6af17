use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::app::AppContext;
use crate::config::WORKER_COUNT;
use crate::error::{AppError, AppResult, InputError};
use crate::models::{parse_criteria, Document};

const CSV_FILENAME: &str = "resumes_scores.csv";

#[derive(Debug, Serialize)]
pub struct CriteriaResponse {
    pub criteria: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub queue_depth: usize,
    pub stored_outcomes: usize,
    pub pending_outcomes: usize,
    pub worker_count: usize,
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// GET /stats
pub async fn stats(State(ctx): State<AppContext>) -> Json<StatsResponse> {
    Json(StatsResponse {
        queue_depth: ctx.queue().depth(),
        stored_outcomes: ctx.store().len(),
        pending_outcomes: ctx.store().pending_count(),
        worker_count: WORKER_COUNT,
    })
}

/// POST /score-resumes - 入队评分任务并返回 CSV
pub async fn score_resumes(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> AppResult<Response> {
    info!("📥 收到 /score-resumes 请求");

    let mut raw_criteria = None;
    let mut documents = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(AppError::multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "criteria" => {
                raw_criteria = Some(field.text().await.map_err(AppError::multipart)?);
            }
            "files" | "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(AppError::multipart)?;
                debug!("收到文件: {} ({} 字节)", filename, bytes.len());
                documents.push(Document::new(filename, bytes.to_vec()));
            }
            other => debug!("忽略表单字段: {}", other),
        }
    }

    // 评分标准先于文件校验，格式错误时不会创建任何任务
    let raw_criteria = raw_criteria.ok_or_else(|| InputError::MissingField {
        field: "criteria".to_string(),
    })?;
    let criteria = parse_criteria(&raw_criteria)?;

    let table = ctx.coordinator().score_batch(criteria, documents).await?;
    let csv = table.to_csv()?;

    info!("📄 CSV 已生成，返回 {} 行", table.rows.len());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", CSV_FILENAME),
            ),
        ],
        csv,
    )
        .into_response())
}

/// POST /extract-criteria - 从职位描述中提取评分标准
pub async fn extract_criteria(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> AppResult<Json<CriteriaResponse>> {
    info!("📥 收到 /extract-criteria 请求");

    let mut document = None;
    while let Some(field) = multipart.next_field().await.map_err(AppError::multipart)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(AppError::multipart)?;
            document = Some(Document::new(filename, bytes.to_vec()));
        }
    }

    let document = document.ok_or_else(|| InputError::MissingField {
        field: "file".to_string(),
    })?;

    let criteria = ctx.criteria_flow().run(document).await?;
    Ok(Json(CriteriaResponse { criteria }))
}
