pub mod order_ctx;
pub mod order_flow;

pub use order_ctx::OrderCtx;
pub use order_flow::{dismiss_modal, OrderFlow, SubmissionState};
