//! 订单流水线 - 编排层
//!
//! 逐个处理订单，最后打包输出目录

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::infrastructure::FormDriver;
use crate::models::{ArtifactLayout, OrderRecord, ReceiptArtifact};
use crate::services::{BundleArchiver, DocumentRenderer};
use crate::utils::logging::log_order_start;
use crate::workflow::{dismiss_modal, OrderCtx, OrderFlow};

/// 一次运行的结果
#[derive(Debug)]
pub struct RunSummary {
    pub receipts: Vec<ReceiptArtifact>,
    /// 压缩包中的文件数
    pub archived_files: usize,
}

/// 按输入顺序逐个提交订单
///
/// 第一个致命错误会中止整个循环，后面的订单不再处理
pub async fn process_orders<D, R>(
    flow: &OrderFlow,
    driver: &D,
    renderer: &R,
    orders: &[OrderRecord],
) -> Result<Vec<ReceiptArtifact>>
where
    D: FormDriver + ?Sized,
    R: DocumentRenderer + ?Sized,
{
    let total = orders.len();
    let mut receipts = Vec::with_capacity(total);

    for (index, order) in orders.iter().enumerate() {
        let ctx = OrderCtx::new(order.order_number.as_str(), index + 1, total);
        log_order_start(&ctx);

        match flow.run(driver, renderer, order, &ctx).await {
            Ok(receipt) => {
                info!("{} ✅ 回执完成: {}", ctx, receipt.path.display());
                receipts.push(receipt);
            }
            Err(e) => {
                error!("{} ❌ 处理失败，终止运行: {:#}", ctx, e);
                return Err(e);
            }
        }
    }

    Ok(receipts)
}

/// 完整流水线：关闭初始弹窗 → 处理全部订单 → 打包
///
/// 只有全部订单成功后才会调用一次打包
pub async fn run_pipeline<D, R, A>(
    flow: &OrderFlow,
    driver: &D,
    renderer: &R,
    archiver: &A,
    layout: &ArtifactLayout,
    orders: &[OrderRecord],
) -> Result<RunSummary>
where
    D: FormDriver + ?Sized,
    R: DocumentRenderer + ?Sized,
    A: BundleArchiver + ?Sized,
{
    dismiss_modal(driver).await?;

    let receipts = process_orders(flow, driver, renderer, orders).await?;

    let archived_files = archiver
        .archive_folder(layout.output_dir(), layout.archive_path())
        .await?;

    Ok(RunSummary {
        receipts,
        archived_files,
    })
}

/// 准备输出目录
///
/// `clean` 为 true 时删除输出目录下的回执与截图（只看顶层的普通文件）和旧压缩包，
/// 保证压缩包里只有本次运行的产物；其他文件和子目录原样保留
pub async fn prepare_output(layout: &ArtifactLayout, clean: bool) -> Result<()> {
    let output_dir = layout.output_dir();
    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("无法创建输出目录: {}", output_dir.display()))?;

    if clean {
        let removed = remove_stale_artifacts(output_dir).await?;
        if removed > 0 {
            info!("🧹 已清理上次运行的 {} 个产物", removed);
        }
        if tokio::fs::try_exists(layout.archive_path()).await? {
            tokio::fs::remove_file(layout.archive_path())
                .await
                .with_context(|| format!("无法删除旧压缩包: {}", layout.archive_path().display()))?;
        }
    }
    Ok(())
}

/// 删除目录顶层的 `*.pdf` / `*.png` 普通文件，返回删除数量
async fn remove_stale_artifacts(output_dir: &Path) -> Result<usize> {
    let mut entries = tokio::fs::read_dir(output_dir)
        .await
        .with_context(|| format!("无法读取输出目录: {}", output_dir.display()))?;

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        if !ArtifactLayout::is_artifact(&path) {
            continue;
        }
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("无法删除旧产物: {}", path.display()))?;
        removed += 1;
    }
    Ok(removed)
}
