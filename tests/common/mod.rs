#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use axum::Router;
use tripmap::browser::{BrowserBackend, BrowserSession, DownloadedFile, LaunchOptions};
use tripmap::error::{AppResult, BrowserError};
use tripmap::{create_router, AppState, Config};

/// 记录所有浏览器操作的假后端
#[derive(Default)]
pub struct MockBackend {
    pub launches: Mutex<Vec<LaunchOptions>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub closes: Arc<AtomicUsize>,
    pub fail_download: bool,
}

impl MockBackend {
    pub fn failing_download() -> Self {
        Self {
            fail_download: true,
            ..Self::default()
        }
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserBackend for MockBackend {
    async fn launch(&self, options: &LaunchOptions) -> AppResult<Box<dyn BrowserSession>> {
        self.launches.lock().unwrap().push(options.clone());
        Ok(Box::new(MockSession {
            download_dir: options.download_dir.clone(),
            calls: self.calls.clone(),
            closes: self.closes.clone(),
            fail_download: self.fail_download,
        }))
    }
}

struct MockSession {
    download_dir: Option<PathBuf>,
    calls: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    fail_download: bool,
}

impl MockSession {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BrowserSession for MockSession {
    async fn goto(&mut self, url: &str) -> AppResult<()> {
        self.record(format!("goto {}", url));
        Ok(())
    }

    async fn call_hook(&mut self, hook: &str, payload: &str, wait: bool) -> AppResult<()> {
        let locations = serde_json::from_str::<serde_json::Value>(payload)
            .ok()
            .and_then(|v| v["locations"].as_array().map(Vec::len))
            .unwrap_or_default();
        self.record(format!("hook {} locations={} wait={}", hook, locations, wait));
        Ok(())
    }

    async fn screenshot(&mut self, path: &Path) -> AppResult<()> {
        self.record("screenshot".to_string());
        std::fs::write(path, b"\x89PNG fake").unwrap();
        Ok(())
    }

    async fn wait_for_download(&mut self, timeout: Duration) -> AppResult<DownloadedFile> {
        self.record(format!("download timeout={}", timeout.as_secs()));
        if self.fail_download {
            return Err(BrowserError::DownloadTimeout {
                secs: timeout.as_secs(),
            }
            .into());
        }
        let dir = self.download_dir.clone().expect("下载目录未设置");
        std::fs::create_dir_all(&dir).unwrap();
        let temp_path = dir.join("7c1e5a0b-guid");
        std::fs::write(&temp_path, b"webm").unwrap();
        Ok(DownloadedFile {
            suggested_filename: "trip-animation.webm".to_string(),
            temp_path,
        })
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        self.record("close".to_string());
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 测试用配置：无等待、产物写入临时目录
pub fn test_config(output_dir: &Path) -> Config {
    Config {
        templates_dir: format!("{}/templates", env!("CARGO_MANIFEST_DIR")),
        static_dir: output_dir.join("static").display().to_string(),
        public_base_url: "http://tripmap.test".to_string(),
        mapbox_api_key: "test-mapbox-key".to_string(),
        printify_api_key: "test-printify-key".to_string(),
        screenshot_path: output_dir.join("map.png").display().to_string(),
        download_dir: output_dir.join("downloads").display().to_string(),
        render_delay_secs: 0,
        per_location_secs: 15,
        download_buffer_secs: 10,
        ..Config::default()
    }
}

pub fn test_router(config: &Config, backend: Arc<MockBackend>) -> Router {
    let state = AppState::new(config, backend);
    create_router(state, &config.static_dir)
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
