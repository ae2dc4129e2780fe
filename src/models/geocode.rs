//! 地理编码相关模型
//!
//! 上游返回的地点记录不做本地建模，按 JSON 原样透传

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// `/get-address-suggestions` 请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub address: Option<String>,
}

impl SuggestionRequest {
    /// 去掉空白后的地址，空串视为未提供
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
    }
}

/// 上游 FeatureCollection 外层结构
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<JsonValue>,
}
