//! API Gateway 代理事件适配
//!
//! 把代理事件翻译成进程内的 HTTP 请求，再把响应翻译回代理响应结构

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, HOST};
use axum::http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use lambda_http::aws_lambda_events::apigw::ApiGatewayProxyRequest;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;
use url::Url;

use super::handler::HandleRequest;
use crate::error::{AdapterError, AppResult};

/// API Gateway 默认域名中的标识
const GATEWAY_HOST_MARKER: &str = "execute-api";
const BINARY_PREFIXES: [&str; 2] = ["image/", "audio/"];

/// API Gateway (REST) 代理事件
pub type ProxyEvent = ApiGatewayProxyRequest;

/// 带 httpMethod 字段的才是代理事件
pub fn is_proxy_event(event: &JsonValue) -> bool {
    event.get("httpMethod").is_some()
}

/// 解析代理事件，`httpMethod` 为 null 时按 GET 处理
pub fn parse_event(mut payload: JsonValue) -> Result<ProxyEvent, AdapterError> {
    match payload.get_mut("httpMethod") {
        Some(method) if method.is_null() => *method = JsonValue::from("GET"),
        Some(_) => {}
        None => return Err(AdapterError::MalformedEvent("缺少 httpMethod".to_string())),
    }
    serde_json::from_value(payload).map_err(|e| AdapterError::MalformedEvent(e.to_string()))
}

/// 返回给 API Gateway 的代理响应
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub is_base64_encoded: bool,
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// 应用挂载前缀（API Gateway 默认域名下为 `/<stage>`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPrefix(pub String);

/// 记录处理器发出的状态和响应头，只允许发出一次
#[derive(Debug, Default)]
pub struct ResponseHead {
    inner: Option<(StatusCode, HeaderMap)>,
}

impl ResponseHead {
    pub fn start(
        &mut self,
        status: StatusCode,
        headers: HeaderMap,
    ) -> Result<&(StatusCode, HeaderMap), AdapterError> {
        if self.inner.is_some() {
            return Err(AdapterError::CompletedTwice);
        }
        Ok(&*self.inner.insert((status, headers)))
    }
}

/// 把代理事件翻译成 HTTP 请求
pub fn build_request(event: &ProxyEvent) -> Result<Request<Body>, AdapterError> {
    let path = event.path.as_deref().filter(|p| !p.is_empty()).unwrap_or("/");
    let host = event
        .headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    let mut url = Url::parse(&format!("https://{}", host))
        .map_err(|e| AdapterError::MalformedEvent(format!("无效的 Host {}: {}", host, e)))?;
    url.set_path(path);
    if !event.multi_value_query_string_parameters.is_empty() {
        let mut query = url.query_pairs_mut();
        for (key, value) in event.multi_value_query_string_parameters.iter() {
            query.append_pair(key, value);
        }
    }

    let prefix = if host.contains(GATEWAY_HOST_MARKER) {
        let stage = event
            .request_context
            .stage
            .as_deref()
            .ok_or_else(|| AdapterError::MalformedEvent("缺少 requestContext.stage".to_string()))?;
        format!("/{}", stage)
    } else {
        String::new()
    };

    let body = match &event.body {
        Some(body) if event.is_base64_encoded => STANDARD.decode(body)?,
        Some(body) => body.clone().into_bytes(),
        None => Vec::new(),
    };

    let mut request = Request::builder()
        .method(event.http_method.clone())
        .uri(url.as_str())
        .body(Body::from(body))
        .map_err(|e| AdapterError::MalformedEvent(e.to_string()))?;

    // 网关同时给出单值和多值请求头，多值版本更完整
    let source = if event.multi_value_headers.is_empty() {
        &event.headers
    } else {
        &event.multi_value_headers
    };
    let headers = request.headers_mut();
    for (name, value) in source {
        headers.append(name.clone(), value.clone());
    }
    headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
    if !prefix.is_empty() {
        let value = HeaderValue::from_str(&prefix)
            .map_err(|e| AdapterError::MalformedEvent(format!("无效的 stage: {}", e)))?;
        headers.insert("x-forwarded-prefix", value);
    }
    request.extensions_mut().insert(MountPrefix(prefix));

    Ok(request)
}

/// 把处理器的响应翻译成代理响应
pub async fn build_proxy_response(response: Response<Body>) -> Result<ProxyResponse, AdapterError> {
    let (parts, body) = response.into_parts();
    let mut head = ResponseHead::default();
    let (status, headers) = head.start(parts.status, parts.headers)?;

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| AdapterError::BodyReadFailed(e.to_string()))?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let is_binary = BINARY_PREFIXES.iter().any(|p| content_type.starts_with(p));

    let body = if is_binary {
        STANDARD.encode(&bytes)
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    // 同名响应头以最后一个为准
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    Ok(ProxyResponse {
        is_base64_encoded: is_binary,
        status_code: status.as_u16(),
        headers,
        body,
    })
}

/// 一次调用：本地直接请求，或 API Gateway 代理事件
pub enum Invocation {
    Direct(Request<Body>),
    Gateway(ProxyEvent),
}

/// 与 `Invocation` 对应的结果
pub enum Completion {
    Direct(Response<Body>),
    Gateway(ProxyResponse),
}

/// 在同一个处理器前面挂两种翻译方式
pub struct LambdaAdapter<H> {
    handler: H,
}

impl<H: HandleRequest> LambdaAdapter<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub async fn call(&self, invocation: Invocation) -> AppResult<Completion> {
        match invocation {
            Invocation::Direct(request) => Ok(Completion::Direct(self.handler.handle(request).await)),
            Invocation::Gateway(event) => Ok(Completion::Gateway(self.call_gateway(&event).await?)),
        }
    }

    /// 处理 API Gateway 代理事件
    pub async fn call_gateway(&self, event: &ProxyEvent) -> AppResult<ProxyResponse> {
        let request = build_request(event)?;
        debug!("代理事件转换为请求: {} {}", request.method(), request.uri());
        let response = self.handler.handle(request).await;
        Ok(build_proxy_response(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    fn event(value: JsonValue) -> ProxyEvent {
        parse_event(value).unwrap()
    }

    #[test]
    fn gateway_host_gets_stage_prefix() {
        let request = build_request(&event(json!({
            "httpMethod": "POST",
            "path": "/bg",
            "headers": { "Host": "abc123.execute-api.us-east-1.amazonaws.com" },
            "requestContext": { "stage": "prod" },
            "body": "{}"
        })))
        .unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri().scheme_str(), Some("https"));
        assert_eq!(request.uri().path(), "/bg");
        assert_eq!(
            request.extensions().get::<MountPrefix>(),
            Some(&MountPrefix("/prod".to_string()))
        );
        assert_eq!(request.headers()["x-forwarded-prefix"], "/prod");
    }

    #[test]
    fn custom_domain_has_no_prefix() {
        let request = build_request(&event(json!({
            "httpMethod": "GET",
            "path": "/map",
            "headers": { "host": "maps.example.com" },
            "requestContext": { "stage": "prod" }
        })))
        .unwrap();

        assert_eq!(
            request.extensions().get::<MountPrefix>(),
            Some(&MountPrefix(String::new()))
        );
        assert!(request.headers().get("x-forwarded-prefix").is_none());
    }

    #[test]
    fn defaults_and_multi_value_query() {
        let request = build_request(&event(json!({
            "httpMethod": null,
            "multiValueQueryStringParameters": { "tag": ["a", "b c"] }
        })))
        .unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), "/");
        assert_eq!(request.uri().query(), Some("tag=a&tag=b+c"));
    }

    #[test]
    fn multi_value_headers_are_preferred() {
        let request = build_request(&event(json!({
            "httpMethod": "GET",
            "path": "/",
            "headers": { "Accept": "text/html" },
            "multiValueHeaders": { "Accept": ["text/html", "application/json"] }
        })))
        .unwrap();

        let accept: Vec<_> = request.headers().get_all("accept").iter().collect();
        assert_eq!(accept, ["text/html", "application/json"]);
    }

    #[test]
    fn gateway_host_without_stage_is_rejected() {
        let err = build_request(&event(json!({
            "httpMethod": "GET",
            "headers": { "Host": "abc.execute-api.eu-west-1.amazonaws.com" }
        })))
        .unwrap_err();
        assert!(matches!(err, AdapterError::MalformedEvent(_)));
    }

    #[test]
    fn response_head_accepts_one_emission() {
        let mut head = ResponseHead::default();
        let (status, _) = head.start(StatusCode::OK, HeaderMap::new()).unwrap();
        assert_eq!(*status, StatusCode::OK);
        let err = head.start(StatusCode::OK, HeaderMap::new()).unwrap_err();
        assert!(matches!(err, AdapterError::CompletedTwice));
    }

    #[test]
    fn detects_proxy_events_by_method_field() {
        assert!(is_proxy_event(&json!({ "httpMethod": "GET" })));
        assert!(!is_proxy_event(&json!({ "path": "/" })));
        assert!(matches!(
            parse_event(json!({ "path": "/" })),
            Err(AdapterError::MalformedEvent(_))
        ));
    }
}
