//! # Robot Order Submit
//!
//! 按订单 CSV 逐行在网页上下单，保存回执 PDF 与机器人预览截图，最后打包成一个 zip
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `FormDriver` - 元素级操作接口（点击、选择、填写、查询、截图）
//! - `ChromeFormDriver` / `JsExecutor` - 基于 chromiumoxide 的实现
//!
//! ### ② 业务能力层（Services）
//! - `ReceiptBuilder` - 回执渲染与截图嵌入
//! - `SnapshotNormalizer` - 截图并缩放到标准宽度
//! - `ZipArchiver` - 打包输出目录
//! - `order_source` - 下载并读取订单
//!
//! ### ③ 流程层（Workflow）
//! - `OrderFlow` - 单个订单的提交状态机（填写 → 提交 → 重试/成功）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 顺序处理全部订单，最后打包一次
//! - `orchestrator/app` - 浏览器生命周期与运行入口

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChromeFormDriver, FormDriver, JsExecutor};
pub use models::{ArtifactLayout, OrderRecord, ReceiptArtifact, SnapshotArtifact};
pub use orchestrator::{run_pipeline, App, RunSummary};
pub use workflow::{OrderCtx, OrderFlow};
