//! 日志工具模块
//!
//! 提供日志初始化以及格式化输出的辅助函数
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::ArtifactLayout;
use crate::orchestrator::RunSummary;
use crate::workflow::OrderCtx;

/// 初始化日志
///
/// 默认级别为 info，`verbose` 时为 debug；设置了 `RUST_LOG` 时以其为准。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 机器人订单自动提交");
    info!("🌐 下单页面: {}", config.target_url);
    info!("📂 输出目录: {}", config.output_dir);
    match config.max_submit_attempts {
        Some(max) => info!("🔁 单个订单最多提交 {} 次", max),
        None => info!("🔁 提交失败将一直重试"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录订单加载信息
pub fn log_orders_loaded(total: usize) {
    info!("✓ 找到 {} 个待处理的订单", total);
    info!("📋 将按文件顺序逐个处理\n");
}

/// 记录单个订单开始
pub fn log_order_start(ctx: &OrderCtx) {
    info!("\n{} {}", ctx, "─".repeat(30));
    info!("{} 开始处理", ctx);
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, layout: &ArtifactLayout) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    let complete = summary.receipts.iter().filter(|r| r.is_complete()).count();
    info!("✅ 回执: {} 份（含截图 {} 份）", summary.receipts.len(), complete);
    if complete < summary.receipts.len() {
        warn!("⚠️ 有 {} 份回执缺少截图页", summary.receipts.len() - complete);
    }
    info!("📦 压缩包: {} ({} 个文件)", layout.archive_path().display(), summary.archived_files);
    info!("{}", "=".repeat(60));
}
