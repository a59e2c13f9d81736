//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用生命周期
//! - 初始化日志、启动或连接浏览器
//! - 下载并读取订单
//! - 准备输出目录、输出最终统计
//!
//! ### `pipeline` - 订单流水线
//! - 按输入顺序逐个处理订单，不并发
//! - 任何订单出现致命错误立即终止整次运行
//! - 全部完成后只打包一次
//!
//! ## 层次关系
//!
//! ```text
//! app (持有 Browser)
//!     ↓
//! pipeline (处理 Vec<OrderRecord>)
//!     ↓
//! workflow::OrderFlow (处理单个 OrderRecord)
//!     ↓
//! services (回执 / 截图 / 打包)
//!     ↓
//! infrastructure (FormDriver / JsExecutor)
//! ```

pub mod app;
pub mod pipeline;

pub use app::App;
pub use pipeline::{prepare_output, process_orders, run_pipeline, RunSummary};
