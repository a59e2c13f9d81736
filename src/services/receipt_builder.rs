//! 回执生成服务
//!
//! 回执只会被写两次：先由页面上的回执 HTML 生成，再追加一页截图

use anyhow::Result;
use tracing::{debug, info};

use crate::error::{AppError, OrderError};
use crate::models::{ArtifactLayout, ReceiptArtifact, SnapshotArtifact};
use crate::services::document_renderer::DocumentRenderer;

pub struct ReceiptBuilder {
    layout: ArtifactLayout,
}

impl ReceiptBuilder {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// 把回执 HTML 渲染为 `{output_dir}/{订单号}.pdf`
    pub async fn render_receipt<R: DocumentRenderer + ?Sized>(
        &self,
        renderer: &R,
        markup: &str,
        order_number: &str,
    ) -> Result<ReceiptArtifact> {
        if markup.trim().is_empty() {
            return Err(AppError::Order(OrderError::EmptyReceipt {
                order_number: order_number.to_string(),
            })
            .into());
        }

        let path = self.layout.receipt_path(order_number)?;
        renderer.html_to_document(markup, &path).await?;
        debug!("回执已生成: {}", path.display());

        Ok(ReceiptArtifact {
            order_number: order_number.to_string(),
            path,
            embedded_snapshots: 0,
        })
    }

    /// 把截图追加到回执末尾
    ///
    /// 每次调用都会追加一页，调用方保证每个回执只调用一次
    pub async fn embed_snapshot<R: DocumentRenderer + ?Sized>(
        &self,
        renderer: &R,
        snapshot: &SnapshotArtifact,
        mut receipt: ReceiptArtifact,
    ) -> Result<ReceiptArtifact> {
        let appended = renderer
            .append_files(std::slice::from_ref(&snapshot.path), &receipt.path, true)
            .await?;
        receipt.embedded_snapshots += appended;
        info!(
            "✓ 截图已嵌入回执: {} -> {}",
            snapshot.path.display(),
            receipt.path.display()
        );
        Ok(receipt)
    }
}
