use std::path::PathBuf;
use std::sync::Arc;

use crate::browser::BrowserBackend;
use crate::clients::{CatalogClient, GeocodingClient};
use crate::config::Config;
use crate::orchestrator::MapExporter;

/// 各处理器共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub templates_dir: Arc<PathBuf>,
    pub geocoder: Arc<GeocodingClient>,
    pub catalog: Arc<CatalogClient>,
    pub exporter: Arc<MapExporter>,
}

impl AppState {
    /// 按配置创建各客户端，凭据在这里显式传入
    pub fn new(config: &Config, backend: Arc<dyn BrowserBackend>) -> Self {
        Self {
            templates_dir: Arc::new(PathBuf::from(&config.templates_dir)),
            geocoder: Arc::new(GeocodingClient::new(config)),
            catalog: Arc::new(CatalogClient::new(config)),
            exporter: Arc::new(MapExporter::new(config, backend)),
        }
    }
}
