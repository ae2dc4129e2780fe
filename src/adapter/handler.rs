//! 统一的请求处理能力
//!
//! 路由逻辑只实现一次；本地服务和 Lambda 各自把请求翻译成 `http::Request` 后交给它

use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

/// 处理一个 HTTP 请求并返回响应
#[async_trait]
pub trait HandleRequest: Send + Sync {
    async fn handle(&self, request: Request<Body>) -> Response<Body>;
}

#[async_trait]
impl HandleRequest for Router {
    async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let result: Result<Response<Body>, Infallible> = self.clone().oneshot(request).await;
        match result {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}
