//! 文档渲染能力
//!
//! - `html_to_document`：把 HTML 片段渲染成 PDF
//! - `append_files`：把图片追加到已有 PDF

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::Page;
use tracing::debug;

use crate::services::pdf_pages;

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// 渲染 HTML 并写入 `path`，已存在的文件会被覆盖
    async fn html_to_document(&self, markup: &str, path: &Path) -> Result<()>;

    /// 把文件作为新页面追加到 `target`；`append` 为 false 时重建文档
    ///
    /// 返回追加的页数
    async fn append_files(&self, files: &[PathBuf], target: &Path, append: bool) -> Result<usize> {
        let files = files.to_vec();
        let target = target.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
            pdf_pages::append_image_pages(&paths, &target, append)
        })
        .await
        .context("PDF 追加任务异常退出")?
    }
}

/// 用浏览器打印功能生成 PDF
///
/// 使用独立的渲染页面，不影响下单页面的状态
pub struct ChromePdfRenderer {
    page: Page,
}

impl ChromePdfRenderer {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl DocumentRenderer for ChromePdfRenderer {
    async fn html_to_document(&self, markup: &str, path: &Path) -> Result<()> {
        self.page
            .set_content(wrap_html(markup))
            .await
            .context("无法加载回执 HTML")?;

        let pdf = self
            .page
            .pdf(PrintToPdfParams::default())
            .await
            .context("打印 PDF 失败")?;

        tokio::fs::write(path, &pdf)
            .await
            .with_context(|| format!("无法写入 PDF: {}", path.display()))?;
        debug!("PDF 已生成: {} ({} 字节)", path.display(), pdf.len());
        Ok(())
    }
}

fn wrap_html(markup: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>{}</body></html>",
        markup
    )
}
