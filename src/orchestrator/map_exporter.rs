//! 地图导出器
//!
//! 两个阶段严格串行，每个阶段独占一个浏览器会话：
//! 1. 截图：`prepForScreenshot` → 固定等待 → 整页截图
//! 2. 动画：`getAnimation` → 等待页面触发下载 → 按建议文件名保存

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::browser::{with_session, BrowserBackend, DownloadedFile, LaunchOptions};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ItineraryRequest;

/// 截图前调用的页面钩子
pub const SCREENSHOT_HOOK: &str = "prepForScreenshot";
/// 开始录制动画的页面钩子
pub const ANIMATION_HOOK: &str = "getAnimation";

const FALLBACK_FILENAME: &str = "animation.webm";

static UNSAFE_FILENAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w.\-]+").expect("文件名字符过滤规则无效"));

/// 一次导出生成的文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifacts {
    pub screenshot: PathBuf,
    pub animation: PathBuf,
}

/// 地图导出器
pub struct MapExporter {
    backend: Arc<dyn BrowserBackend>,
    config: Config,
}

impl MapExporter {
    pub fn new(config: &Config, backend: Arc<dyn BrowserBackend>) -> Self {
        Self {
            backend,
            config: config.clone(),
        }
    }

    /// 执行完整导出
    ///
    /// 地点为空时直接返回输入错误，不启动浏览器
    pub async fn export(&self, itinerary: &ItineraryRequest) -> AppResult<ExportArtifacts> {
        if itinerary.is_empty() {
            return Err(AppError::invalid_input("locations 不能为空"));
        }

        let payload = itinerary.to_payload()?;
        info!("🗺️ 开始导出地图，共 {} 个地点", itinerary.location_count());

        let screenshot = self.capture_screenshot(&payload).await?;
        info!("✓ 截图完成: {}", screenshot.display());

        let timeout = self.config.download_timeout(itinerary.location_count());
        let animation = self.export_animation(&payload, timeout).await?;
        info!("✓ 动画导出完成: {}", animation.display());

        Ok(ExportArtifacts {
            screenshot,
            animation,
        })
    }

    /// 阶段一：渲染全部地点后整页截图
    async fn capture_screenshot(&self, payload: &str) -> AppResult<PathBuf> {
        let options = self.launch_options(None);
        let path = PathBuf::from(&self.config.screenshot_path);
        ensure_parent_dir(&path).await?;

        let url = self.config.map_page_url();
        let payload = payload.to_string();
        let delay = self.config.render_delay();

        with_session(self.backend.as_ref(), &options, move |session| {
            Box::pin(async move {
                session.goto(&url).await?;
                session.call_hook(SCREENSHOT_HOOK, &payload, true).await?;
                debug!("等待页面渲染 {} 秒", delay.as_secs());
                sleep(delay).await;
                session.screenshot(&path).await?;
                Ok::<_, AppError>(path)
            })
        })
        .await
    }

    /// 阶段二：播放动画，等待页面录制完成后触发的下载
    async fn export_animation(&self, payload: &str, timeout: Duration) -> AppResult<PathBuf> {
        let download_dir = PathBuf::from(&self.config.download_dir);
        let options = self.launch_options(Some(download_dir.clone()));

        let url = self.config.map_page_url();
        let payload = payload.to_string();

        let download = with_session(self.backend.as_ref(), &options, move |session| {
            Box::pin(async move {
                session.goto(&url).await?;
                session.call_hook(ANIMATION_HOOK, &payload, false).await?;
                debug!("等待动画下载，超时 {} 秒", timeout.as_secs());
                session.wait_for_download(timeout).await
            })
        })
        .await?;

        persist_download(&download, &download_dir).await
    }

    fn launch_options(&self, download_dir: Option<PathBuf>) -> LaunchOptions {
        LaunchOptions {
            viewport_width: self.config.viewport_width,
            viewport_height: self.config.viewport_height,
            download_dir,
        }
    }
}

/// 以建议文件名保存下载，并删除浏览器的临时文件
pub async fn persist_download(download: &DownloadedFile, dir: &Path) -> AppResult<PathBuf> {
    let target = dir.join(sanitize_filename(&download.suggested_filename));
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::file(dir.display().to_string(), e))?;

    tokio::fs::copy(&download.temp_path, &target)
        .await
        .map_err(|e| AppError::file(download.temp_path.display().to_string(), e))?;
    if download.temp_path != target {
        tokio::fs::remove_file(&download.temp_path)
            .await
            .map_err(|e| AppError::file(download.temp_path.display().to_string(), e))?;
    }

    Ok(target)
}

/// 只保留文件名中的安全字符，去掉路径成分
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned.to_string()
    }
}

async fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file(parent.display().to_string(), e))?;
    }
    Ok(())
}
