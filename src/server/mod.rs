//! HTTP 服务
//!
//! - `POST /score-resumes`：multipart（`criteria` JSON 字符串 + 多个 `files`），返回 CSV
//! - `POST /extract-criteria`：multipart（单个 `file`），返回评分标准列表
//! - `GET /health`、`GET /stats`

pub mod routes;

use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::app::AppContext;
use crate::error::{AppError, AppResult};

/// 构建路由
pub fn build_router(ctx: AppContext) -> Router {
    let max_upload_bytes = ctx.config().max_upload_bytes;

    Router::new()
        .route("/health", get(routes::health))
        .route("/stats", get(routes::stats))
        .route("/score-resumes", post(routes::score_resumes))
        .route("/extract-criteria", post(routes::extract_criteria))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// 绑定监听地址
pub async fn bind(addr: SocketAddr) -> AppResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Internal(format!("无法绑定地址 {}: {}", addr, e)))
}

/// 在 `listener` 上提供服务，`shutdown` 取消后不再接受新连接，等在途请求完成后返回
pub async fn serve(
    listener: TcpListener,
    ctx: AppContext,
    shutdown: CancellationToken,
) -> AppResult<()> {
    let router = build_router(ctx);

    match listener.local_addr() {
        Ok(addr) => info!("🌐 服务已启动: http://{}", addr),
        Err(e) => warn!("无法读取监听地址: {}", e),
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Internal(format!("HTTP 服务异常: {}", e)))?;

    info!("HTTP 服务已停止");
    Ok(())
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            return StatusCode::BAD_REQUEST;
        }
        match self {
            AppError::BatchTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("❌ 请求失败 ({}): {}", status, self);
        } else {
            warn!("⚠️ 请求被拒绝 ({}): {}", status, self);
        }

        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}
