//! 订单数据来源
//!
//! 下载订单 CSV 并解析为 `OrderRecord` 列表

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::OrderRecord;

/// 下载订单 CSV，已存在的文件会被覆盖
pub async fn download_orders(url: &str, dest: &Path) -> Result<u64> {
    info!("⬇️ 正在下载订单文件: {}", url);

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("请求订单文件失败: {}", url))?
        .error_for_status()
        .with_context(|| format!("订单文件返回错误状态: {}", url))?;
    let bytes = response.bytes().await?;

    tokio::fs::write(dest, &bytes)
        .await
        .with_context(|| format!("无法写入订单文件: {}", dest.display()))?;

    debug!("订单文件已保存: {} ({} 字节)", dest.display(), bytes.len());
    Ok(bytes.len() as u64)
}

/// 读取订单 CSV，保持文件中的行顺序
pub fn read_orders(path: &Path) -> Result<Vec<OrderRecord>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("无法读取订单文件: {}", path.display()))?;
    parse_orders(file).with_context(|| format!("无法解析订单文件: {}", path.display()))
}

/// 从任意读取源解析订单
pub fn parse_orders<R: std::io::Read>(reader: R) -> Result<Vec<OrderRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut orders = Vec::new();
    for (index, row) in csv_reader.deserialize::<OrderRecord>().enumerate() {
        let order = row.with_context(|| format!("第 {} 行订单格式错误", index + 1))?;
        orders.push(order);
    }
    Ok(orders)
}
