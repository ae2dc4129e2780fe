use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::session::{BrowserBackend, BrowserSession, DownloadedFile, LaunchOptions};
use crate::error::{AppResult, BrowserError};
use crate::infrastructure::JsExecutor;

/// 基于 chromiumoxide 的无头 Chromium 后端
pub struct ChromiumBackend {
    chrome_executable: Option<PathBuf>,
}

impl ChromiumBackend {
    pub fn new(chrome_executable: Option<PathBuf>) -> Self {
        Self { chrome_executable }
    }
}

#[async_trait]
impl BrowserBackend for ChromiumBackend {
    async fn launch(&self, options: &LaunchOptions) -> AppResult<Box<dyn BrowserSession>> {
        info!("🚀 启动无头浏览器...");
        debug!("启动参数: {:?}", options);

        // 配置无头浏览器
        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .window_size(options.viewport_width, options.viewport_height)
            .viewport(Viewport {
                width: options.viewport_width,
                height: options.viewport_height,
                ..Default::default()
            })
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--autoplay-policy=no-user-gesture-required",
            ]);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(|e| {
            error!("配置无头浏览器失败: {}", e);
            BrowserError::LaunchFailed(e)
        })?;

        // 启动浏览器
        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动无头浏览器失败: {}", e);
            BrowserError::LaunchFailed(e.to_string())
        })?;
        debug!("无头浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let mut session = ChromiumSession {
            browser,
            handler_task,
            executor: None,
            downloads: None,
        };

        if let Some(dir) = &options.download_dir {
            if let Err(e) = session.enable_downloads(dir).await {
                session.shutdown().await;
                return Err(e);
            }
        }

        Ok(Box::new(session))
    }
}

/// 下载事件订阅
struct DownloadWatch {
    dir: PathBuf,
    will_begin: EventStream<EventDownloadWillBegin>,
    progress: EventStream<EventDownloadProgress>,
}

/// 单个 Chromium 进程及其页面
struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    executor: Option<JsExecutor>,
    downloads: Option<DownloadWatch>,
}

impl ChromiumSession {
    async fn enable_downloads(&mut self, dir: &Path) -> AppResult<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| crate::error::AppError::file(dir.display().to_string(), e))?;
        let dir = std::path::absolute(dir)
            .map_err(|e| crate::error::AppError::file(dir.display().to_string(), e))?;

        let params = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::AllowAndName)
            .download_path(dir.display().to_string())
            .events_enabled(true)
            .build()
            .map_err(BrowserError::DownloadFailed)?;

        // 先订阅事件再允许下载，避免漏掉事件
        let will_begin = self.browser.event_listener::<EventDownloadWillBegin>().await?;
        let progress = self.browser.event_listener::<EventDownloadProgress>().await?;
        self.browser.execute(params).await?;
        debug!("已允许下载到: {}", dir.display());

        self.downloads = Some(DownloadWatch {
            dir,
            will_begin,
            progress,
        });
        Ok(())
    }

    fn executor(&self) -> AppResult<&JsExecutor> {
        self.executor.as_ref().ok_or_else(|| {
            BrowserError::NavigationFailed {
                url: "about:blank".to_string(),
                reason: "尚未打开页面".to_string(),
            }
            .into()
        })
    }

    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("正常关闭浏览器失败，尝试强制结束: {}", e);
            if let Some(Err(e)) = self.browser.kill().await {
                error!("强制结束浏览器失败: {}", e);
            }
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler_task.abort();
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn goto(&mut self, url: &str) -> AppResult<()> {
        debug!("创建新页面并导航到: {}", url);
        let page = self.browser.new_page(url).await.map_err(|e| {
            error!("导航到 {} 失败: {}", url, e);
            BrowserError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        // 添加短暂延迟以等待页面脚本挂载
        sleep(Duration::from_millis(300)).await;

        info!("✅ 无头浏览器已导航到: {}", url);
        self.executor = Some(JsExecutor::new(page));
        Ok(())
    }

    async fn call_hook(&mut self, hook: &str, payload: &str, wait: bool) -> AppResult<()> {
        self.executor()?.call_hook(hook, payload, wait).await
    }

    async fn screenshot(&mut self, path: &Path) -> AppResult<()> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.executor()?
            .page()
            .save_screenshot(params, path)
            .await
            .map_err(|e| BrowserError::ScreenshotFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn wait_for_download(&mut self, timeout: Duration) -> AppResult<DownloadedFile> {
        let watch = self.downloads.as_mut().ok_or_else(|| {
            BrowserError::DownloadFailed("该会话未启用下载".to_string())
        })?;

        let wait = async {
            let begin: Arc<EventDownloadWillBegin> = match watch.will_begin.next().await {
                Some(begin) => begin,
                None => {
                    return Err(BrowserError::DownloadFailed("下载事件流已关闭".to_string()));
                }
            };
            info!("📥 开始下载: {}", begin.suggested_filename);

            while let Some(progress) = watch.progress.next().await {
                if progress.guid != begin.guid {
                    continue;
                }
                match progress.state {
                    DownloadProgressState::Completed => {
                        return Ok(DownloadedFile {
                            suggested_filename: begin.suggested_filename.clone(),
                            temp_path: watch.dir.join(&begin.guid),
                        });
                    }
                    DownloadProgressState::Canceled => {
                        return Err(BrowserError::DownloadFailed(format!(
                            "下载被取消: {}",
                            begin.suggested_filename
                        )));
                    }
                    _ => {}
                }
            }
            Err(BrowserError::DownloadFailed("下载进度事件流已关闭".to_string()))
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(BrowserError::DownloadTimeout {
                secs: timeout.as_secs(),
            }
            .into()),
        }
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        info!("关闭无头浏览器");
        (*self).shutdown().await;
        Ok(())
    }
}
