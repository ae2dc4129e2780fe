use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tripmap::utils::logging;
use tripmap::{create_router, AppState, ChromiumBackend, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config_path = std::env::var("TRIPMAP_CONFIG").unwrap_or_else(|_| "tripmap.toml".to_string());
    let config = Config::load(&config_path)?;

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config);

    let backend = Arc::new(ChromiumBackend::new(
        config.chrome_executable.as_ref().map(PathBuf::from),
    ));
    let state = AppState::new(&config, backend);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr))?;
    info!("✅ 服务已启动: http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
