//! 浏览器会话抽象
//!
//! 编排层只通过 `BrowserBackend` / `BrowserSession` 使用浏览器，
//! 每个会话由 `with_session` 负责获取和释放

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::error::AppResult;

/// 启动参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// 设置后允许下载并保存到该目录
    pub download_dir: Option<PathBuf>,
}

/// 浏览器完成的一次下载，文件仍在临时位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// 页面建议的文件名
    pub suggested_filename: String,
    /// 浏览器写入的临时文件
    pub temp_path: PathBuf,
}

/// 能启动无头浏览器的后端
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    async fn launch(&self, options: &LaunchOptions) -> AppResult<Box<dyn BrowserSession>>;
}

/// 单个无头浏览器会话，独占一个浏览器进程
#[async_trait]
pub trait BrowserSession: Send {
    /// 打开页面并等待加载
    async fn goto(&mut self, url: &str) -> AppResult<()>;

    /// 调用页面上挂在 window 下的钩子函数
    ///
    /// `wait` 为 true 时等待钩子返回的 Promise
    async fn call_hook(&mut self, hook: &str, payload: &str, wait: bool) -> AppResult<()>;

    /// 整页截图
    async fn screenshot(&mut self, path: &Path) -> AppResult<()>;

    /// 等待下一次下载完成
    async fn wait_for_download(&mut self, timeout: Duration) -> AppResult<DownloadedFile>;

    /// 结束浏览器进程
    async fn close(self: Box<Self>) -> AppResult<()>;
}

/// 启动一个会话，执行 `f`，无论成功失败都关闭浏览器
pub async fn with_session<T, F>(
    backend: &dyn BrowserBackend,
    options: &LaunchOptions,
    f: F,
) -> AppResult<T>
where
    F: for<'s> FnOnce(&'s mut dyn BrowserSession) -> BoxFuture<'s, AppResult<T>>,
{
    let mut session = backend.launch(options).await?;
    let result = f(session.as_mut()).await;

    match session.close().await {
        Ok(()) => debug!("浏览器会话已关闭"),
        Err(e) => warn!("关闭浏览器会话失败: {}", e),
    }

    result
}
