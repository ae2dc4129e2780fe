//! 页面模板服务
//!
//! 首页、地图页（同时是无头浏览器的目标页）和 404 页。
//! 模板里的 `{{prefix}}` 替换为挂载前缀，API Gateway 默认域名下资源路径带上 stage

use std::path::Path;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use tracing::warn;

use super::state::AppState;
use crate::adapter::MountPrefix;
use crate::error::{AppError, AppResult};

pub const INDEX_TEMPLATE: &str = "index.html";
pub const MAP_TEMPLATE: &str = "map.html";
pub const NOT_FOUND_TEMPLATE: &str = "errors/404.html";

const PREFIX_PLACEHOLDER: &str = "{{prefix}}";

async fn render(templates_dir: &Path, name: &str, prefix: &str) -> AppResult<Html<String>> {
    let path = templates_dir.join(name);
    let body = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| AppError::file(path.display().to_string(), e))?;
    Ok(Html(body.replace(PREFIX_PLACEHOLDER, prefix)))
}

fn prefix_of(prefix: &Option<Extension<MountPrefix>>) -> &str {
    prefix
        .as_ref()
        .map(|Extension(MountPrefix(p))| p.as_str())
        .unwrap_or_default()
}

/// GET /
pub async fn index(
    State(state): State<AppState>,
    prefix: Option<Extension<MountPrefix>>,
) -> AppResult<Html<String>> {
    render(&state.templates_dir, INDEX_TEMPLATE, prefix_of(&prefix)).await
}

/// GET /map
pub async fn map_page(
    State(state): State<AppState>,
    prefix: Option<Extension<MountPrefix>>,
) -> AppResult<Html<String>> {
    render(&state.templates_dir, MAP_TEMPLATE, prefix_of(&prefix)).await
}

/// 未匹配的路由
pub async fn not_found(
    State(state): State<AppState>,
    prefix: Option<Extension<MountPrefix>>,
) -> Response {
    match render(&state.templates_dir, NOT_FOUND_TEMPLATE, prefix_of(&prefix)).await {
        Ok(page) => (StatusCode::NOT_FOUND, page).into_response(),
        Err(e) => {
            warn!("404 页面不可用: {}", e);
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}
