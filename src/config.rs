use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 本地服务监听地址
    pub bind_addr: String,
    /// 本服务对外可访问的根地址（无头浏览器通过它访问 /map）
    pub public_base_url: String,
    /// 页面模板目录
    pub templates_dir: String,
    /// 前端构建产物目录
    pub static_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 地理编码配置 ---
    pub mapbox_api_key: String,
    pub mapbox_base_url: String,
    /// 使用本地样例数据，不请求上游
    pub geocoder_use_fixture: bool,
    // --- 商品目录配置 ---
    pub printify_api_key: String,
    pub printify_base_url: String,
    // --- 无头浏览器配置 ---
    pub chrome_executable: Option<String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub screenshot_path: String,
    pub download_dir: String,
    /// 截图前等待页面渲染的秒数
    pub render_delay_secs: u64,
    /// 每个地点的动画时长（秒）
    pub per_location_secs: u64,
    /// 下载等待的额外缓冲（秒）
    pub download_buffer_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            public_base_url: "http://127.0.0.1:5000".to_string(),
            templates_dir: "templates".to_string(),
            static_dir: "client/build".to_string(),
            verbose_logging: false,
            mapbox_api_key: String::new(),
            mapbox_base_url: "https://api.mapbox.com".to_string(),
            geocoder_use_fixture: false,
            printify_api_key: String::new(),
            printify_base_url: "https://api.printify.com/v1/".to_string(),
            chrome_executable: None,
            viewport_width: 1920,
            viewport_height: 1080,
            screenshot_path: "output/map.png".to_string(),
            download_dir: "output/downloads".to_string(),
            render_delay_secs: 15,
            per_location_secs: 15,
            download_buffer_secs: 10,
        }
    }
}

impl Config {
    /// 只从环境变量加载，未设置的字段使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载（文件不存在时使用默认值），再应用环境变量
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let base = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| AppError::file(path.display().to_string(), e))?;
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };
        Ok(base.with_env_overrides())
    }

    /// 解析 TOML 配置内容
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            bind_addr: env_string("BIND_ADDR").unwrap_or(self.bind_addr),
            public_base_url: env_string("PUBLIC_BASE_URL").unwrap_or(self.public_base_url),
            templates_dir: env_string("TEMPLATES_DIR").unwrap_or(self.templates_dir),
            static_dir: env_string("STATIC_DIR").unwrap_or(self.static_dir),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(self.verbose_logging),
            mapbox_api_key: env_string("MAPBOX_API_KEY").unwrap_or(self.mapbox_api_key),
            mapbox_base_url: env_string("MAPBOX_BASE_URL").unwrap_or(self.mapbox_base_url),
            geocoder_use_fixture: env_parse("GEOCODER_USE_FIXTURE")
                .unwrap_or(self.geocoder_use_fixture),
            printify_api_key: env_string("PRINTIFY_API_KEY").unwrap_or(self.printify_api_key),
            printify_base_url: env_string("PRINTIFY_BASE_URL").unwrap_or(self.printify_base_url),
            chrome_executable: env_string("CHROME_EXECUTABLE").or(self.chrome_executable),
            viewport_width: env_parse("VIEWPORT_WIDTH").unwrap_or(self.viewport_width),
            viewport_height: env_parse("VIEWPORT_HEIGHT").unwrap_or(self.viewport_height),
            screenshot_path: env_string("SCREENSHOT_PATH").unwrap_or(self.screenshot_path),
            download_dir: env_string("DOWNLOAD_DIR").unwrap_or(self.download_dir),
            render_delay_secs: env_parse("RENDER_DELAY_SECS").unwrap_or(self.render_delay_secs),
            per_location_secs: env_parse("PER_LOCATION_SECS").unwrap_or(self.per_location_secs),
            download_buffer_secs: env_parse("DOWNLOAD_BUFFER_SECS")
                .unwrap_or(self.download_buffer_secs),
        }
    }

    /// 截图前的固定等待
    pub fn render_delay(&self) -> Duration {
        Duration::from_secs(self.render_delay_secs)
    }

    /// 动画导出阶段的下载超时：每个地点的时长加上固定缓冲
    pub fn download_timeout(&self, location_count: usize) -> Duration {
        Duration::from_secs(self.per_location_secs * location_count as u64 + self.download_buffer_secs)
    }

    /// 无头浏览器访问的地图页地址
    pub fn map_page_url(&self) -> String {
        format!("{}/map", self.public_base_url.trim_end_matches('/'))
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
