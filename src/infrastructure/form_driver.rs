//! 表单驱动接口
//!
//! 状态机只通过这个 trait 操作页面，便于替换浏览器实现和测试

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

/// 页面元素级操作
///
/// 除 `query_optional` 外，找不到目标元素都视为错误
#[async_trait]
pub trait FormDriver: Send + Sync {
    /// 元素句柄
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<()>;

    async fn click(&self, selector: &str) -> Result<()>;

    /// 点击文字完全匹配的按钮
    async fn click_text(&self, text: &str) -> Result<()>;

    /// 按显示文字选择下拉框选项
    async fn select_option(&self, selector: &str, label: &str) -> Result<()>;

    /// 清空输入框后写入文本
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;

    /// 查询元素，不存在时返回 `None` 而不是报错
    async fn query_optional(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// 把元素区域截图保存为 PNG
    async fn screenshot_element(&self, element: &Self::Element, path: &Path) -> Result<()>;

    async fn inner_html(&self, selector: &str) -> Result<String>;
}
