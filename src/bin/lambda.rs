//! API Gateway 代理事件入口
//!
//! 事件经 `LambdaAdapter` 翻译后交给与本地服务相同的 Router

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value as JsonValue;
use tracing::{error, info_span, Instrument};
use tripmap::error::AdapterError;
use tripmap::utils::logging;
use tripmap::adapter::{is_proxy_event, parse_event};
use tripmap::{create_router, AppState, ChromiumBackend, Config, LambdaAdapter};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init_json();

    let config = Config::from_env();
    let backend = Arc::new(ChromiumBackend::new(
        config.chrome_executable.as_ref().map(PathBuf::from),
    ));
    let state = AppState::new(&config, backend);
    let adapter = LambdaAdapter::new(create_router(state, &config.static_dir));
    let adapter = &adapter;

    run(service_fn(|event: LambdaEvent<JsonValue>| async move {
        let (payload, context) = event.into_parts();
        handle_event(adapter, payload)
            .instrument(info_span!("lambda", request_id = %context.request_id))
            .await
    }))
    .await
}

async fn handle_event(adapter: &LambdaAdapter<Router>, payload: JsonValue) -> Result<JsonValue, Error> {
    if !is_proxy_event(&payload) {
        // 没有 httpMethod 的调用不经过网关，只能由本地服务处理
        error!("收到非代理事件，忽略");
        return Err(AdapterError::MalformedEvent(
            "缺少 httpMethod，直接调用请使用本地服务".to_string(),
        )
        .into());
    }

    let event = parse_event(payload)?;
    let response = adapter.call_gateway(&event).await?;
    Ok(serde_json::to_value(response)?)
}
