/// 商品目录 API 客户端
///
/// 只读转发到 Printify，返回原始 JSON
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::CatalogResource;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};
use url::Url;

/// 商品目录客户端
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    /// 创建新的商品目录客户端
    pub fn new(config: &Config) -> Self {
        let mut base_url = config.printify_base_url.clone();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: config.printify_api_key.clone(),
        }
    }

    /// 获取目录资源，失败时记录日志并返回 None
    pub async fn fetch(&self, resource: CatalogResource) -> Option<JsonValue> {
        match self.request(resource).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("获取商品目录 {} 失败: {}", resource.name(), e);
                None
            }
        }
    }

    async fn request(&self, resource: CatalogResource) -> AppResult<JsonValue> {
        let url = Url::parse(&self.base_url)
            .and_then(|base| base.join(resource.upstream_path()))
            .map_err(|e| AppError::Config(format!("无效的商品目录地址 {}: {}", self.base_url, e)))?;
        let endpoint = url.to_string();
        debug!("请求商品目录: {}", endpoint);

        let res = self
            .http
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json;charset=utf-8")
            .header(USER_AGENT, "tripmap")
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }
            .into());
        }

        res.json()
            .await
            .map_err(|e| AppError::api_request_failed(endpoint, e))
    }
}
