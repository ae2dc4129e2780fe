//! 行程数据模型
//!
//! 前端提交的行程原样转交给页面脚本，服务端只校验地点列表非空

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// 行程中的单个地点
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// 前端输入框 ID
    #[serde(default)]
    pub id: String,
    /// 地址文本
    #[serde(default)]
    pub address: String,
    /// 到达时间
    #[serde(default)]
    pub arrival: String,
    /// 离开时间
    #[serde(default)]
    pub departure: String,
    /// 经纬度，JSON 字符串形式的 `[lon, lat]`
    #[serde(default)]
    pub coordinates: Option<String>,
    /// 关联图片
    #[serde(default)]
    pub images: Vec<JsonValue>,
    /// 前端附带的其他字段，原样保留
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

/// `/bg` 请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItineraryRequest {
    #[serde(default)]
    pub locations: Vec<Location>,
    /// 地图底图瓦片地址
    #[serde(rename = "tileSrc", default)]
    pub tile_src: String,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ItineraryRequest {
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// 序列化为注入页面脚本的 JSON
    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
