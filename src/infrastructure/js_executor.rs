//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"执行 JS"的能力

use chromiumoxide::Page;
use tracing::debug;

use crate::error::{AppResult, BrowserError};

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露调用页面钩子的能力
/// - 不认识行程数据，只接收序列化好的 JSON
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于截图等操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 调用 `window.<hook>(payload)`
    ///
    /// # 参数
    /// - `hook`: 页面上的函数名
    /// - `payload`: 已序列化的 JSON 参数
    /// - `wait`: 是否等待钩子返回的 Promise 完成
    pub async fn call_hook(&self, hook: &str, payload: &str, wait: bool) -> AppResult<()> {
        let script = hook_script(hook, payload, wait);
        debug!("调用页面钩子 {} (等待完成: {})", hook, wait);

        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::ScriptExecutionFailed {
                hook: hook.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }
}

/// 构建钩子调用脚本
///
/// 不等待时用 `void` 丢弃返回值，避免 evaluate 阻塞在长时间运行的 Promise 上
fn hook_script(hook: &str, payload: &str, wait: bool) -> String {
    if wait {
        format!(
            r#"
            (async () => {{
                if (typeof window.{hook} !== "function") {{
                    throw new Error("window.{hook} is not defined");
                }}
                await window.{hook}({payload});
                return true;
            }})()
            "#
        )
    } else {
        format!("void window.{hook}({payload})")
    }
}
