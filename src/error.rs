use thiserror::Error;

/// 应用程序错误类型
///
/// 按来源分层：输入错误与解析错误在任何任务入队之前返回给调用方；
/// 评分错误由 worker 吸收为 Failed 结果；批次超时是独立的一类。
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 文档文本提取错误
    #[error("文档解析错误: {0}")]
    Extract(#[from] ExtractError),
    /// 评分 / LLM 服务错误
    #[error("评分服务错误: {0}")]
    Scoring(#[from] ScoringError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 批次等待超过截止时间
    #[error("等待评分结果超时 ({deadline_secs}秒内仍有 {pending}/{total} 个任务未完成)")]
    BatchTimeout {
        pending: usize,
        total: usize,
        deadline_secs: u64,
    },
    /// 任务队列已关闭（worker 已退出）
    #[error("任务队列已关闭，无法提交任务")]
    QueueClosed,
    /// 其他内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 请求参数错误
#[derive(Debug, Error)]
pub enum InputError {
    /// criteria 不是字符串数组
    #[error("Invalid criteria format: {reason}")]
    InvalidCriteria { reason: String },
    /// 请求中没有任何文件
    #[error("请求中没有上传任何文件")]
    NoDocuments,
    /// 缺少必需的表单字段
    #[error("缺少表单字段: {field}")]
    MissingField { field: String },
    /// multipart 读取失败
    #[error("读取上传内容失败: {reason}")]
    Multipart { reason: String },
}

/// 文档文本提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 不支持的文件类型
    #[error("Unsupported file type: {filename}")]
    UnsupportedFormat { filename: String },
    /// 解析文件失败
    #[error("解析文件 {filename} 失败: {reason}")]
    ParseFailed { filename: String, reason: String },
}

/// 评分服务错误
#[derive(Debug, Error)]
pub enum ScoringError {
    /// 网络失败或调用超时
    #[error("网络请求失败: {reason}")]
    Network { reason: String },
    /// 上游返回错误或无法解析的内容
    #[error("上游服务返回异常: {reason}")]
    Upstream { reason: String },
    /// 响应缺少必需字段
    #[error("响应缺少字段 '{field}'")]
    Schema { field: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
    /// 配置值非法
    #[error("配置项 {field} 非法: {reason}")]
    InvalidValue { field: String, reason: String },
    /// 配置文件读取或解析失败
    #[error("配置文件 {path} 加载失败: {reason}")]
    FileLoadFailed { path: String, reason: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建 multipart 读取错误
    pub fn multipart(source: impl std::fmt::Display) -> Self {
        AppError::Input(InputError::Multipart {
            reason: source.to_string(),
        })
    }

    /// 是否属于调用方输入问题（应返回 4xx）
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Input(_) | AppError::Extract(_))
    }
}

impl ScoringError {
    pub fn upstream(reason: impl std::fmt::Display) -> Self {
        ScoringError::Upstream {
            reason: reason.to_string(),
        }
    }

    pub fn schema(field: impl Into<String>) -> Self {
        ScoringError::Schema {
            field: field.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(AppError::from(InputError::InvalidCriteria {
            reason: "not a list".to_string()
        })
        .is_client_error());
        assert!(AppError::from(ExtractError::UnsupportedFormat {
            filename: "a.txt".to_string()
        })
        .is_client_error());
        assert!(!AppError::QueueClosed.is_client_error());
        assert!(!AppError::BatchTimeout {
            pending: 1,
            total: 2,
            deadline_secs: 90
        }
        .is_client_error());
    }

    #[test]
    fn test_display_keeps_source_message() {
        let err = AppError::from(ScoringError::schema("scores"));
        assert!(err.to_string().contains("scores"));
    }
}
