use thiserror::Error;

/// 应用程序错误类型
///
/// 服务层统一返回 `anyhow::Result`，这里的类型随 `anyhow::Error` 一起传递，
/// 调用方可以用 `downcast_ref` 识别具体原因。
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 订单处理错误
    #[error("订单错误: {0}")]
    Order(#[from] OrderError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {reason}")]
    LaunchFailed { reason: String },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 等待超时后仍找不到元素
    #[error("找不到页面元素: {selector}")]
    ElementNotFound { selector: String },
}

/// 订单处理错误
#[derive(Debug, Error)]
pub enum OrderError {
    /// 达到提交次数上限仍未成功
    #[error("订单 {order_number} 提交 {attempts} 次后仍未成功")]
    SubmitAttemptsExhausted { order_number: String, attempts: usize },
    /// 订单号不能作为文件名
    #[error("订单号无法用作文件名: {value:?}")]
    InvalidOrderNumber { value: String },
    /// 回执区域内容为空
    #[error("订单 {order_number} 的回执内容为空")]
    EmptyReceipt { order_number: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 图片尺寸无效
    #[error("图片无效 ({path}): {reason}")]
    InvalidImage { path: String, reason: String },
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
    /// 配置文件解析失败
    #[error("配置文件 {path} 解析失败: {source}")]
    FileParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建元素缺失错误
    pub fn element_not_found(selector: impl Into<String>) -> Self {
        AppError::Browser(BrowserError::ElementNotFound {
            selector: selector.into(),
        })
    }

    /// 创建浏览器连接错误
    pub fn browser_connection_failed(
        port: u16,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::ConnectionFailed {
            port,
            source: Box::new(source),
        })
    }

    /// 创建导航失败错误
    pub fn navigation_failed(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Browser(BrowserError::NavigationFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建环境变量解析错误
    pub fn env_parse_failed(
        var_name: impl Into<String>,
        value: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        AppError::Config(ConfigError::EnvVarParseFailed {
            var_name: var_name.into(),
            value: value.into(),
            expected_type: expected_type.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
