//! 调用方式适配层
//!
//! - `handler`：`HandleRequest` 能力，由 axum Router 实现
//! - `gateway`：API Gateway 代理事件 ⇄ HTTP 请求/响应

pub mod gateway;
pub mod handler;

pub use gateway::{
    build_proxy_response, build_request, is_proxy_event, parse_event, Completion, Invocation,
    LambdaAdapter, MountPrefix, ProxyEvent, ProxyResponse, ResponseHead,
};
pub use handler::HandleRequest;
