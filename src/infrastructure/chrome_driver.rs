//! 基于 chromiumoxide 的表单驱动

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::Element;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::form_driver::FormDriver;
use crate::infrastructure::js_executor::{js_string, JsExecutor};

/// 轮询元素的间隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Chrome 表单驱动
///
/// 每次操作后停顿 `slow_mo`；需要操作的元素最多等待 `element_timeout`
pub struct ChromeFormDriver {
    executor: JsExecutor,
    slow_mo: Duration,
    element_timeout: Duration,
}

impl ChromeFormDriver {
    pub fn new(executor: JsExecutor, config: &Config) -> Self {
        Self {
            executor,
            slow_mo: config.slow_mo(),
            element_timeout: config.element_timeout(),
        }
    }

    async fn pace(&self) {
        if !self.slow_mo.is_zero() {
            sleep(self.slow_mo).await;
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.executor
            .eval_as(format!(
                "document.querySelector({}) !== null",
                js_string(selector)
            ))
            .await
    }

    /// 等待元素出现后返回句柄，超时报 ElementNotFound
    async fn wait_for_element(&self, selector: &str) -> Result<Element> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            if self.exists(selector).await? {
                return Ok(self.executor.page().find_element(selector).await?);
            }
            if Instant::now() >= deadline {
                return Err(AppError::element_not_found(selector).into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// 反复执行返回 bool 的脚本，直到返回 true 或超时
    async fn retry_script(&self, script: &str, target: &str) -> Result<()> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            if self.executor.eval_as::<bool>(script).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AppError::element_not_found(target).into());
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl FormDriver for ChromeFormDriver {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| AppError::navigation_failed(url, e))?;
        self.pace().await;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        debug!("点击: {}", selector);
        let element = self.wait_for_element(selector).await?;
        element
            .click()
            .await
            .with_context(|| format!("点击 {} 失败", selector))?;
        self.pace().await;
        Ok(())
    }

    async fn click_text(&self, text: &str) -> Result<()> {
        debug!("点击文字按钮: {}", text);
        let script = format!(
            r#"(() => {{
                const target = {};
                const button = Array.from(document.querySelectorAll('button'))
                    .find(b => b.textContent.trim() === target);
                if (!button) return false;
                button.click();
                return true;
            }})()"#,
            js_string(text)
        );
        self.retry_script(&script, &format!("text={}", text)).await?;
        self.pace().await;
        Ok(())
    }

    async fn select_option(&self, selector: &str, label: &str) -> Result<()> {
        debug!("选择 {} -> {}", selector, label);
        self.wait_for_element(selector).await?;
        // 走原生 setter 并派发 change，页面框架才能感知到
        let script = format!(
            r#"(() => {{
                const select = document.querySelector({});
                if (!select) return false;
                const option = Array.from(select.options)
                    .find(o => o.label === {label} || o.text.trim() === {label});
                if (!option) return false;
                const setter = Object.getOwnPropertyDescriptor(HTMLSelectElement.prototype, 'value').set;
                setter.call(select, option.value);
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            js_string(selector),
            label = js_string(label)
        );
        self.retry_script(&script, &format!("{} option {}", selector, label))
            .await?;
        self.pace().await;
        Ok(())
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        debug!("填写 {}", selector);
        let element = self.wait_for_element(selector).await?;
        let clear = format!(
            r#"(() => {{
                const input = document.querySelector({});
                const setter = Object.getOwnPropertyDescriptor(HTMLInputElement.prototype, 'value').set;
                setter.call(input, '');
                input.dispatchEvent(new Event('input', {{ bubbles: true }}));
                return true;
            }})()"#,
            js_string(selector)
        );
        self.executor.eval(clear).await?;
        element.click().await?;
        element
            .type_str(text)
            .await
            .with_context(|| format!("输入 {} 失败", selector))?;
        self.pace().await;
        Ok(())
    }

    async fn query_optional(&self, selector: &str) -> Result<Option<Element>> {
        if !self.exists(selector).await? {
            return Ok(None);
        }
        Ok(self.executor.page().find_element(selector).await.ok())
    }

    async fn screenshot_element(&self, element: &Element, path: &Path) -> Result<()> {
        let png = element
            .screenshot(CaptureScreenshotFormat::Png)
            .await
            .context("元素截图失败")?;
        tokio::fs::write(path, png)
            .await
            .with_context(|| format!("无法写入截图: {}", path.display()))?;
        debug!("截图已保存: {}", path.display());
        Ok(())
    }

    async fn inner_html(&self, selector: &str) -> Result<String> {
        let element = self.wait_for_element(selector).await?;
        let html = element
            .inner_html()
            .await
            .with_context(|| format!("读取 {} 内容失败", selector))?;
        Ok(html.unwrap_or_default())
    }
}
