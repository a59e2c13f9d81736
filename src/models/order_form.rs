//! 下单页面上用到的选择器

/// 头部下拉框
pub const HEAD_SELECT: &str = "#head";
/// 腿部零件编号输入框
pub const LEGS_INPUT: &str = "input[placeholder='Enter the part number for the legs']";
/// 收货地址输入框
pub const ADDRESS_INPUT: &str = "#address";
/// 提交按钮
pub const SUBMIT_BUTTON: &str = "#order";
/// 下单成功后才出现的 "再来一单" 按钮，兼作成功标记
pub const SUCCESS_MARKER: &str = "#order-another";
/// 回执区域
pub const RECEIPT: &str = "#receipt";
/// 机器人预览图
pub const ROBOT_PREVIEW: &str = "#robot-preview-image";
/// 弹窗确认按钮上的文字
pub const MODAL_ACCEPT_TEXT: &str = "OK";

/// 身体选项的单选框，选择器由编号直接拼出
pub fn body_selector(code: &str) -> String {
    format!("#id-body-{}", code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_selector_is_derived_from_code() {
        assert_eq!(body_selector("2"), "#id-body-2");
        assert_eq!(body_selector("6"), "#id-body-6");
    }
}
