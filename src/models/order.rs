use serde::{Deserialize, Serialize};

/// 一行订单数据
///
/// 字段名与订单 CSV 的表头一一对应，值原样保留为文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "Order number")]
    pub order_number: String,
    #[serde(rename = "Head")]
    pub head: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "Legs")]
    pub legs: String,
    #[serde(rename = "Address")]
    pub address: String,
}

impl OrderRecord {
    pub fn new(
        order_number: impl Into<String>,
        head: impl Into<String>,
        body: impl Into<String>,
        legs: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            order_number: order_number.into(),
            head: head.into(),
            body: body.into(),
            legs: legs.into(),
            address: address.into(),
        }
    }
}
