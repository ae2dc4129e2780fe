//! # tripmap
//!
//! 行程地图服务：地址地理编码、商品目录代理，以及用无头浏览器把行程渲染成截图和动画
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 唯一的 page owner，提供调用页面钩子的能力
//!
//! ### ② 浏览器与外部客户端
//! - `browser/` - `BrowserBackend` / `BrowserSession`，会话在作用域内获取与释放
//! - `clients/` - Mapbox 地理编码、Printify 商品目录
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/map_exporter` - 截图阶段 → 动画阶段，严格串行
//!
//! ### ④ 接口与适配
//! - `api/` - axum 路由、处理器、页面模板
//! - `adapter/` - 本地请求与 API Gateway 代理事件共用一个处理器
//!
//! ## 模块结构

pub mod adapter;
pub mod api;
pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod utils;

// 重新导出常用类型
pub use adapter::{HandleRequest, LambdaAdapter, ProxyEvent, ProxyResponse};
pub use api::{create_router, AppState};
pub use browser::{BrowserBackend, BrowserSession, ChromiumBackend};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ItineraryRequest, Location};
pub use orchestrator::MapExporter;
