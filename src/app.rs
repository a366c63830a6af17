use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{Config, WORKER_COUNT};
use crate::error::AppResult;
use crate::orchestrator::{BatchCoordinator, CriteriaFlow};
use crate::queue::{JobQueue, ResultStore};
use crate::services::{FileTextExtractor, LlmService, ScoringClient, TextExtractor};
use crate::server;
use crate::shutdown;
use crate::worker::janitor::spawn_result_janitor;
use crate::worker::{ScoringWorker, WorkerStats};

/// 应用上下文
///
/// 进程启动时构建一次，克隆后交给每个请求处理任务。队列和结果存储只存在于这里。
#[derive(Clone)]
pub struct AppContext {
    config: Arc<Config>,
    queue: JobQueue,
    store: ResultStore,
    coordinator: Arc<BatchCoordinator>,
    criteria_flow: Arc<CriteriaFlow>,
}

/// 后台任务句柄
///
/// worker 和结果清理任务共用 `token`，与 HTTP 服务的关闭信号分开：
/// 服务排空在途请求之后才停止它们。
pub struct BackgroundTasks {
    pub worker: JoinHandle<WorkerStats>,
    pub janitor: JoinHandle<()>,
    token: CancellationToken,
}

impl BackgroundTasks {
    /// 停止 worker 和结果清理任务并等待退出
    pub async fn stop(self) -> Option<WorkerStats> {
        self.token.cancel();

        let stats = match self.worker.await {
            Ok(stats) => {
                info!("✅ 评分 worker 已停止，共处理 {} 个任务", stats.processed);
                Some(stats)
            }
            Err(e) => {
                error!("评分 worker 异常退出: {}", e);
                None
            }
        };
        if let Err(e) = self.janitor.await {
            error!("结果清理任务异常退出: {}", e);
        }
        stats
    }
}

impl AppContext {
    /// 构建上下文并启动唯一的评分 worker 和结果清理任务
    ///
    /// `background_shutdown` 只控制后台任务，不要传入 HTTP 服务的关闭信号。
    pub fn start(
        config: Config,
        scoring_client: Arc<dyn ScoringClient>,
        llm_service: Arc<LlmService>,
        extractor: Arc<dyn TextExtractor>,
        background_shutdown: CancellationToken,
    ) -> (Self, BackgroundTasks) {
        let (queue, receiver) = JobQueue::new();
        let store = ResultStore::new();

        let worker = ScoringWorker::new(
            receiver,
            scoring_client,
            store.clone(),
            config.scoring_timeout(),
        )
        .spawn(background_shutdown.clone());

        let janitor = spawn_result_janitor(
            store.clone(),
            config.result_retention(),
            config.result_sweep_interval(),
            background_shutdown.clone(),
        );

        let coordinator = BatchCoordinator::new(
            queue.clone(),
            store.clone(),
            extractor.clone(),
            config.batch_deadline(),
        );
        let criteria_flow = CriteriaFlow::new(extractor, llm_service);

        let ctx = Self {
            config: Arc::new(config),
            queue,
            store,
            coordinator: Arc::new(coordinator),
            criteria_flow: Arc::new(criteria_flow),
        };

        let background = BackgroundTasks {
            worker,
            janitor,
            token: background_shutdown,
        };
        (ctx, background)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn queue(&self) -> &JobQueue {
        &self.queue
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn coordinator(&self) -> &BatchCoordinator {
        &self.coordinator
    }

    pub fn criteria_flow(&self) -> &CriteriaFlow {
        &self.criteria_flow
    }
}

/// 应用主结构
pub struct App {
    ctx: AppContext,
    background: BackgroundTasks,
    shutdown: CancellationToken,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let shutdown = CancellationToken::new();
        let llm_service = Arc::new(LlmService::new(&config));
        let extractor: Arc<dyn TextExtractor> = Arc::new(FileTextExtractor::new());

        let (ctx, background) = AppContext::start(
            config,
            llm_service.clone(),
            llm_service,
            extractor,
            CancellationToken::new(),
        );

        Ok(Self {
            ctx,
            background,
            shutdown,
        })
    }

    /// 运行 HTTP 服务，直到收到 SIGINT / SIGTERM
    pub async fn run(self) -> AppResult<()> {
        shutdown::install_shutdown_handler(self.shutdown.clone());

        let listener = server::bind(self.ctx.config().listen_addr).await?;
        serve_until_drained(listener, self.ctx, self.background, self.shutdown).await
    }
}

/// 提供 HTTP 服务直到 `shutdown` 被取消
///
/// 在途请求（包括正在等待评分结果的批次）处理完毕后才停止后台任务。
pub async fn serve_until_drained(
    listener: TcpListener,
    ctx: AppContext,
    background: BackgroundTasks,
    shutdown: CancellationToken,
) -> AppResult<()> {
    let served = server::serve(listener, ctx, shutdown).await;
    background.stop().await;
    served
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 简历评分服务启动");
    info!("🌐 监听地址: {}", config.listen_addr);
    info!("🤖 模型: {} ({})", config.llm_model_name, config.llm_api_base_url);
    info!(
        "⏱️ 评分超时 {}秒, 批次截止 {}秒, worker 数 {}",
        config.scoring_timeout_secs, config.batch_deadline_secs, WORKER_COUNT
    );
    info!("{}", "=".repeat(60));
}
