//! 截图服务
//!
//! 截取机器人预览图，再原地缩放到标准宽度

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use tracing::debug;

use crate::error::{AppError, FileError};
use crate::infrastructure::FormDriver;
use crate::models::order_form::ROBOT_PREVIEW;
use crate::models::{ArtifactLayout, SnapshotArtifact};

/// 截图缩放后的标准宽度
pub const CANONICAL_WIDTH: u32 = 500;

pub struct SnapshotNormalizer {
    layout: ArtifactLayout,
}

impl SnapshotNormalizer {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    /// 截取预览元素并缩放到标准宽度
    ///
    /// 预览元素不存在时直接报错，没有替代截图
    pub async fn capture_and_normalize<D: FormDriver + ?Sized>(
        &self,
        driver: &D,
        order_number: &str,
    ) -> Result<SnapshotArtifact> {
        let path = self.layout.snapshot_path(order_number)?;

        let element = driver
            .query_optional(ROBOT_PREVIEW)
            .await?
            .ok_or_else(|| AppError::element_not_found(ROBOT_PREVIEW))?;
        driver.screenshot_element(&element, &path).await?;

        let resize_path = path.clone();
        let (width, height) = tokio::task::spawn_blocking(move || normalize_snapshot(&resize_path))
            .await
            .context("截图缩放任务异常退出")??;

        Ok(SnapshotArtifact {
            order_number: order_number.to_string(),
            path,
            width,
            height,
        })
    }
}

/// 保持宽高比时的目标高度：round(h * 500 / w)，至少为 1
pub fn canonical_height(width: u32, height: u32) -> u32 {
    let scaled = (height as f64 * CANONICAL_WIDTH as f64 / width as f64).round();
    (scaled as u32).max(1)
}

/// 原地把图片缩放到标准宽度，返回新的 (宽, 高)
pub fn normalize_snapshot(path: &Path) -> Result<(u32, u32)> {
    let img = image::open(path).with_context(|| format!("无法读取截图: {}", path.display()))?;

    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(AppError::File(FileError::InvalidImage {
            path: path.display().to_string(),
            reason: format!("尺寸为 {}x{}", width, height),
        })
        .into());
    }

    let target_height = canonical_height(width, height);
    let resized = img.resize_exact(CANONICAL_WIDTH, target_height, FilterType::CatmullRom);
    resized
        .save(path)
        .with_context(|| format!("无法保存截图: {}", path.display()))?;

    debug!(
        "截图已缩放: {}x{} -> {}x{} ({})",
        width,
        height,
        CANONICAL_WIDTH,
        target_height,
        path.display()
    );
    Ok((CANONICAL_WIDTH, target_height))
}
