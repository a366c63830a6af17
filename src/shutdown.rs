use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// 安装关闭信号处理：收到 SIGINT 或 SIGTERM 时取消 `token`
///
/// 只有 HTTP 服务监听这个 token，后台任务在服务排空后由 `App` 单独停止。
pub fn install_shutdown_handler(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("无法监听 SIGINT: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("无法监听 SIGTERM: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => info!("🛑 收到 SIGINT，开始优雅关闭"),
            _ = terminate => info!("🛑 收到 SIGTERM，开始优雅关闭"),
            _ = token.cancelled() => return,
        }

        token.cancel();
    });
}
