//! 运行产物：回执 PDF、预览截图与输出目录布局

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, AppResult, OrderError};

/// 回执文件扩展名
pub const RECEIPT_EXTENSION: &str = "pdf";
/// 截图文件扩展名
pub const SNAPSHOT_EXTENSION: &str = "png";

static SAFE_STEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+$").expect("静态正则表达式")
});

/// 提交后页面探测的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// 成功标记出现
    Success,
    /// 成功标记未出现，需要重新提交
    Failure,
}

/// 输出目录布局
///
/// 每个订单的产物路径只由订单号决定：`{output_dir}/{订单号}.pdf` 与 `.png`
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    output_dir: PathBuf,
    archive_path: PathBuf,
}

impl ArtifactLayout {
    pub fn new(output_dir: impl Into<PathBuf>, archive_path: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            archive_path: archive_path.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// 回执 PDF 路径
    pub fn receipt_path(&self, order_number: &str) -> AppResult<PathBuf> {
        self.artifact_path(order_number, RECEIPT_EXTENSION)
    }

    /// 预览截图路径
    pub fn snapshot_path(&self, order_number: &str) -> AppResult<PathBuf> {
        self.artifact_path(order_number, SNAPSHOT_EXTENSION)
    }

    /// 路径是否是本程序生成的回执或截图（按扩展名判断）
    pub fn is_artifact(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some(RECEIPT_EXTENSION) | Some(SNAPSHOT_EXTENSION)
        )
    }

    fn artifact_path(&self, order_number: &str, extension: &str) -> AppResult<PathBuf> {
        let stem = validate_order_number(order_number)?;
        Ok(self.output_dir.join(format!("{}.{}", stem, extension)))
    }
}

/// 订单号必须能直接作为文件名使用，不能跳出输出目录
pub fn validate_order_number(order_number: &str) -> AppResult<&str> {
    if order_number == "." || order_number == ".." || !SAFE_STEM.is_match(order_number) {
        return Err(AppError::Order(OrderError::InvalidOrderNumber {
            value: order_number.to_string(),
        }));
    }
    Ok(order_number)
}

/// 回执文件
///
/// 先由回执 HTML 生成，再追加一页截图，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptArtifact {
    pub order_number: String,
    pub path: PathBuf,
    /// 已追加进回执的截图数量
    pub embedded_snapshots: usize,
}

impl ReceiptArtifact {
    pub fn is_complete(&self) -> bool {
        self.embedded_snapshots > 0
    }
}

/// 预览截图，已缩放到标准宽度
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotArtifact {
    pub order_number: String,
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}
