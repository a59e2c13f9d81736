//! 机器人头部选项映射
//!
//! 订单里的头部编号 → 下拉框中显示的选项文字

use phf::phf_map;

static HEAD_LABELS: phf::Map<&'static str, &'static str> = phf_map! {
    "1" => "Roll-a-thor head",
    "2" => "Peanut crusher head",
    "3" => "D.A.V.E head",
    "4" => "Andy Roid head",
    "5" => "Spanner mate head",
    "6" => "Drillbit 2000 head",
};

/// 解析头部编号
///
/// 未知编号返回 `None`，调用方跳过下拉框选择，不报错
pub fn resolve_head(code: &str) -> Option<&'static str> {
    HEAD_LABELS.get(code).copied()
}

/// 所有已知的头部编号
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    HEAD_LABELS.keys().copied()
}
