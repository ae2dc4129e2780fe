//! HTTP 接口层
//!
//! 路由、处理器和页面模板，所有调用方式（本地服务 / Lambda）共用同一个 Router

pub mod handlers;
pub mod pages;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
