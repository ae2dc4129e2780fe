use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::Level;

use super::handlers::{export_map, get_address_suggestions, printify};
use super::pages::{index, map_page, not_found};
use super::state::AppState;

/// 行程里可能带 base64 图片，放宽 /bg 的请求体上限
const EXPORT_BODY_LIMIT: usize = 50 * 1024 * 1024;

pub fn create_router(state: AppState, static_dir: &str) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|req: &axum::http::Request<_>| {
            tracing::info_span!("http_request", method = %req.method(), uri = %req.uri())
        })
        .on_response(
            tower_http::trace::DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Millis),
        );

    Router::new()
        .route("/", get(index))
        .route("/map", get(map_page))
        .route("/get-address-suggestions", post(get_address_suggestions))
        .route(
            "/bg",
            post(export_map).layer(DefaultBodyLimit::max(EXPORT_BODY_LIMIT)),
        )
        .route("/printify/{resource}", get(printify))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(trace)
        .with_state(state)
}
