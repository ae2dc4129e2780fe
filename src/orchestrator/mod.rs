//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 驱动无头浏览器把行程渲染成图片和动画，是 `/bg` 接口的核心。
//!
//! ## 层次关系
//!
//! ```text
//! api::handlers (/bg)
//!     ↓
//! orchestrator::MapExporter (截图阶段 → 动画阶段)
//!     ↓
//! browser (BrowserBackend / BrowserSession，会话作用域内获取与释放)
//!     ↓
//! infrastructure (JsExecutor)
//! ```
//!
//! ## 设计原则
//!
//! 1. **严格串行**：截图阶段结束并关闭浏览器后才开始动画阶段
//! 2. **资源隔离**：每个阶段独占一个浏览器进程，不跨阶段、不跨请求
//! 3. **产物落盘**：截图和动画写入本地文件，不放进响应体

pub mod map_exporter;

pub use map_exporter::{ExportArtifacts, MapExporter, ANIMATION_HOOK, SCREENSHOT_HOOK};
