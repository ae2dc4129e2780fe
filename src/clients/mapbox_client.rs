/// 地理编码 API 客户端
///
/// 封装所有与 Mapbox Geocoding API 相关的调用逻辑
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::FeatureCollection;
use crate::utils::truncate_text;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use tracing::{debug, error, warn};
use url::Url;

const FIXTURE: &str = include_str!("../../fixtures/geocode_sample.json");

/// 地理编码客户端
pub struct GeocodingClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    use_fixture: bool,
}

impl GeocodingClient {
    /// 创建新的地理编码客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.mapbox_base_url.clone(),
            api_key: config.mapbox_api_key.clone(),
            use_fixture: config.geocoder_use_fixture,
        }
    }

    /// 获取地址候选列表
    ///
    /// 上游失败（限流、非 200、网络错误）只记录日志并返回 None，
    /// 调用方应把 None 当作"没有候选"处理
    pub async fn suggestions(&self, address: &str) -> Option<Vec<JsonValue>> {
        if self.use_fixture {
            debug!("使用本地样例数据返回地址候选");
            return fixture_features();
        }

        match self.fetch(address).await {
            Ok(features) => {
                debug!(
                    "地址 '{}' 获得 {} 个候选",
                    truncate_text(address, 40),
                    features.len()
                );
                Some(features)
            }
            Err(AppError::Api(ApiError::RateLimited { endpoint })) => {
                warn!("地理编码请求被限流: {}", endpoint);
                None
            }
            Err(e) => {
                warn!("获取地址候选失败: {}", e);
                None
            }
        }
    }

    async fn fetch(&self, address: &str) -> AppResult<Vec<JsonValue>> {
        let url = self.endpoint(address)?;
        let endpoint = url.path().to_string();

        let res = self
            .http
            .get(url)
            .query(&[("access_token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&endpoint, e))?;

        match res.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(ApiError::RateLimited { endpoint }.into()),
            status if !status.is_success() => Err(ApiError::BadStatus {
                endpoint,
                status: status.as_u16(),
            }
            .into()),
            _ => {
                let body: FeatureCollection = res
                    .json()
                    .await
                    .map_err(|e| AppError::api_request_failed(&endpoint, e))?;
                Ok(body.features)
            }
        }
    }

    /// 构建 `{base}/geocoding/v5/mapbox.places/{address}.json`，地址作为单个路径段编码
    fn endpoint(&self, address: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("无效的地理编码地址 {}: {}", self.base_url, e)))?;
        let segment = format!("{}.json", address);
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("地理编码地址不能作为根路径: {}", self.base_url)))?
            .pop_if_empty()
            .extend(&["geocoding", "v5", "mapbox.places", segment.as_str()]);
        Ok(url)
    }
}

fn fixture_features() -> Option<Vec<JsonValue>> {
    match serde_json::from_str::<FeatureCollection>(FIXTURE) {
        Ok(collection) => Some(collection.features),
        Err(e) => {
            error!("本地样例数据解析失败: {}", e);
            None
        }
    }
}
