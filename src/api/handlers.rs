use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::{info, warn};

use super::state::AppState;
use crate::error::AppResult;
use crate::models::{CatalogResource, ItineraryRequest, SuggestionRequest};
use crate::utils::truncate_text;

/// POST /get-address-suggestions
///
/// 上游失败时仍返回 200，响应体为 null
pub async fn get_address_suggestions(
    State(state): State<AppState>,
    Json(request): Json<SuggestionRequest>,
) -> Response {
    let Some(address) = request.address() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "no address supplied" })),
        )
            .into_response();
    };

    info!("查询地址候选: {}", truncate_text(address, 40));
    Json(state.geocoder.suggestions(address).await).into_response()
}

/// POST /bg
///
/// 生成截图和动画文件，成功返回空响应体
pub async fn export_map(
    State(state): State<AppState>,
    Json(itinerary): Json<ItineraryRequest>,
) -> AppResult<StatusCode> {
    if itinerary.is_empty() {
        warn!("导出请求没有地点，忽略");
        return Ok(StatusCode::BAD_REQUEST);
    }

    state.exporter.export(&itinerary).await?;
    Ok(StatusCode::OK)
}

/// GET /printify/{resource}
pub async fn printify(State(state): State<AppState>, Path(resource): Path<String>) -> Response {
    let Some(resource) = CatalogResource::from_name(&resource) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("unknown resource: {}", resource) })),
        )
            .into_response();
    };

    Json(state.catalog.fetch(resource).await).into_response()
}
