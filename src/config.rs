use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 评分 worker 数量
///
/// 任务严格按入队顺序逐个处理依赖于只有一个消费者，改动前需要重新设计顺序保证。
pub const WORKER_COUNT: usize = 1;

const _: () = assert!(WORKER_COUNT == 1, "scoring queue supports exactly one worker");

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP 监听地址
    pub listen_addr: SocketAddr,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 上传文件大小上限（字节）
    pub max_upload_bytes: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 队列配置 ---
    /// 单次评分调用超时（秒）
    pub scoring_timeout_secs: u64,
    /// 批次等待截止时间（秒）
    pub batch_deadline_secs: u64,
    /// 已完成结果保留时长（秒）
    pub result_retention_secs: u64,
    /// 结果清理间隔（秒）
    pub result_sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            verbose_logging: false,
            max_upload_bytes: 20 * 1024 * 1024,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            scoring_timeout_secs: 60,
            batch_deadline_secs: 90,
            result_retention_secs: 600,
            result_sweep_interval_secs: 60,
        }
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 若设置了 `RESUME_RANKER_CONFIG`，先读取该 TOML 文件作为基础值，
    /// 环境变量再覆盖其中的字段。
    pub fn from_env() -> Result<Self, ConfigError> {
        let base = match std::env::var("RESUME_RANKER_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };

        let config = Self {
            listen_addr: env_parse("LISTEN_ADDR", "SocketAddr")?.unwrap_or(base.listen_addr),
            verbose_logging: env_parse("VERBOSE_LOGGING", "bool")?
                .unwrap_or(base.verbose_logging),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", "usize")?
                .unwrap_or(base.max_upload_bytes),
            llm_api_key: std::env::var("LLM_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .unwrap_or(base.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(base.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(base.llm_model_name),
            scoring_timeout_secs: env_parse("SCORING_TIMEOUT_SECS", "u64")?
                .unwrap_or(base.scoring_timeout_secs),
            batch_deadline_secs: env_parse("BATCH_DEADLINE_SECS", "u64")?
                .unwrap_or(base.batch_deadline_secs),
            result_retention_secs: env_parse("RESULT_RETENTION_SECS", "u64")?
                .unwrap_or(base.result_retention_secs),
            result_sweep_interval_secs: env_parse("RESULT_SWEEP_INTERVAL_SECS", "u64")?
                .unwrap_or(base.result_sweep_interval_secs),
        };

        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileLoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        toml::from_str(&content).map_err(|e| ConfigError::FileLoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// 校验配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            });
        }

        for (field, value) in [
            ("scoring_timeout_secs", self.scoring_timeout_secs),
            ("batch_deadline_secs", self.batch_deadline_secs),
            ("result_sweep_interval_secs", self.result_sweep_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "必须大于 0".to_string(),
                });
            }
        }

        // 结果保留时长不短于批次截止时间
        if self.result_retention_secs < self.batch_deadline_secs {
            return Err(ConfigError::InvalidValue {
                field: "result_retention_secs".to_string(),
                reason: format!(
                    "不能小于 batch_deadline_secs ({})",
                    self.batch_deadline_secs
                ),
            });
        }

        Ok(())
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_timeout_secs)
    }

    pub fn batch_deadline(&self) -> Duration {
        Duration::from_secs(self.batch_deadline_secs)
    }

    pub fn result_retention(&self) -> Duration {
        Duration::from_secs(self.result_retention_secs)
    }

    pub fn result_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.result_sweep_interval_secs)
    }
}

/// 读取并解析环境变量；未设置时返回 `None`，无法解析时报错
fn env_parse<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
        Err(_) => Ok(None),
    }
}
