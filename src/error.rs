use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 上游 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 请求适配错误
    #[error("适配器错误: {0}")]
    Adapter(#[from] AdapterError),
    /// 文件操作错误
    #[error("文件错误 ({path}): {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
    /// 客户端输入错误
    #[error("请求参数错误: {0}")]
    InvalidInput(String),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动无头浏览器失败: {0}")]
    LaunchFailed(String),
    /// 导航失败
    #[error("导航到 {url} 失败: {reason}")]
    NavigationFailed { url: String, reason: String },
    /// 执行脚本失败
    #[error("执行页面脚本 {hook} 失败: {reason}")]
    ScriptExecutionFailed { hook: String, reason: String },
    /// 截图失败
    #[error("截图保存到 {path} 失败: {reason}")]
    ScreenshotFailed { path: String, reason: String },
    /// 下载失败
    #[error("下载失败: {0}")]
    DownloadFailed(String),
    /// 等待下载超时
    #[error("等待下载超时 ({secs} 秒)")]
    DownloadTimeout { secs: u64 },
    /// CDP 协议错误
    #[error("CDP错误: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
}

/// 上游 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回非成功状态
    #[error("API返回错误响应 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 请求频率限制
    #[error("API请求频率限制 ({endpoint})")]
    RateLimited { endpoint: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {0}")]
    JsonParseFailed(#[from] serde_json::Error),
}

/// 请求适配错误
#[derive(Debug, Error)]
pub enum AdapterError {
    /// 完成回调被调用了多次
    #[error("must not call completion callback more than once")]
    CompletedTwice,
    /// 事件无法转换为 HTTP 请求
    #[error("无法解析网关事件: {0}")]
    MalformedEvent(String),
    /// 读取响应体失败
    #[error("读取响应体失败: {0}")]
    BodyReadFailed(String),
    /// 事件体不是合法的 base64
    #[error("事件体 base64 解码失败: {0}")]
    BodyDecodeFailed(#[from] base64::DecodeError),
}

// ========== 从常见错误类型转换 ==========

impl From<chromiumoxide::error::CdpError> for AppError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AppError::Browser(BrowserError::Cdp(err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed(err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File {
            path: String::new(),
            source: err,
        }
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建带路径的文件错误
    pub fn file(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }

    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建客户端输入错误
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("请求处理失败: {}", self);
            (status, "Internal Server Error").into_response()
        } else {
            (status, self.to_string()).into_response()
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
    fn invalid_input_maps_to_bad_request() {
        let err = AppError::invalid_input("locations 不能为空");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn browser_failure_maps_to_server_error() {
        let err = AppError::Browser(BrowserError::DownloadTimeout { secs: 25 });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("25"));
    }

    #[test]
    fn double_completion_message_is_stable() {
        let err = AppError::from(AdapterError::CompletedTwice);
        assert!(err
            .to_string()
            .contains("must not call completion callback more than once"));
    }
}
