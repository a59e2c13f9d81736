//! 订单提交流程 - 流程层
//!
//! 核心职责：定义"一个订单"的完整处理流程
//!
//! 状态流转：
//! 1. Filling：选头部、选身体、填腿部编号和地址，然后等待页面稳定
//! 2. Submitting：点击提交并探测成功标记
//! 3. Retrying：成功标记未出现，只重新点击提交，不重新填写
//! 4. Succeeded：生成回执 → 截图 → 截图嵌入回执 → 点击"再来一单"并关闭弹窗

use std::time::Duration;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, OrderError};
use crate::infrastructure::FormDriver;
use crate::models::order_form::{
    body_selector, ADDRESS_INPUT, HEAD_SELECT, LEGS_INPUT, MODAL_ACCEPT_TEXT, RECEIPT,
    SUBMIT_BUTTON, SUCCESS_MARKER,
};
use crate::models::head::known_codes;
use crate::models::{resolve_head, ArtifactLayout, OrderRecord, ReceiptArtifact, SubmissionOutcome};
use crate::services::{DocumentRenderer, ReceiptBuilder, SnapshotNormalizer};
use crate::workflow::order_ctx::OrderCtx;

/// 提交状态机的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Filling,
    Submitting { attempt: usize },
    Retrying { attempt: usize },
    Succeeded { attempts: usize },
}

/// 订单提交流程
///
/// - 不持有页面，页面由调用方通过 `FormDriver` 传入
/// - 只处理单个订单
pub struct OrderFlow {
    receipt_builder: ReceiptBuilder,
    snapshot_normalizer: SnapshotNormalizer,
    settle_delay: Duration,
    max_submit_attempts: Option<usize>,
}

impl OrderFlow {
    pub fn new(config: &Config, layout: ArtifactLayout) -> Self {
        Self {
            receipt_builder: ReceiptBuilder::new(layout.clone()),
            snapshot_normalizer: SnapshotNormalizer::new(layout),
            settle_delay: config.settle_delay(),
            max_submit_attempts: config.max_submit_attempts,
        }
    }

    /// 处理一个订单，返回嵌入了截图的回执
    pub async fn run<D, R>(
        &self,
        driver: &D,
        renderer: &R,
        order: &OrderRecord,
        ctx: &OrderCtx,
    ) -> Result<ReceiptArtifact>
    where
        D: FormDriver + ?Sized,
        R: DocumentRenderer + ?Sized,
    {
        let attempts = self.submit_until_confirmed(driver, order, ctx).await?;
        info!("{} ✓ 下单成功 (提交 {} 次)", ctx, attempts);

        let receipt = self.store_receipt(driver, renderer, order).await?;
        let snapshot = self
            .snapshot_normalizer
            .capture_and_normalize(driver, &order.order_number)
            .await?;
        let receipt = self
            .receipt_builder
            .embed_snapshot(renderer, &snapshot, receipt)
            .await?;

        driver.click(SUCCESS_MARKER).await?;
        dismiss_modal(driver).await?;

        Ok(receipt)
    }

    /// 驱动状态机直到页面确认成功，返回提交次数
    async fn submit_until_confirmed<D: FormDriver + ?Sized>(
        &self,
        driver: &D,
        order: &OrderRecord,
        ctx: &OrderCtx,
    ) -> Result<usize> {
        let mut state = SubmissionState::Filling;
        loop {
            debug!("{} 状态: {:?}", ctx, state);
            state = match state {
                SubmissionState::Filling => {
                    fill_form(driver, order, ctx).await?;
                    if !self.settle_delay.is_zero() {
                        sleep(self.settle_delay).await;
                    }
                    SubmissionState::Submitting { attempt: 1 }
                }
                SubmissionState::Submitting { attempt } => {
                    driver.click(SUBMIT_BUTTON).await?;
                    match probe_outcome(driver).await? {
                        SubmissionOutcome::Success => SubmissionState::Succeeded { attempts: attempt },
                        SubmissionOutcome::Failure => SubmissionState::Retrying { attempt },
                    }
                }
                SubmissionState::Retrying { attempt } => {
                    warn!("{} ⚠️ 第 {} 次提交失败，重新提交...", ctx, attempt);
                    if let Some(max) = self.max_submit_attempts {
                        if attempt >= max {
                            return Err(AppError::Order(OrderError::SubmitAttemptsExhausted {
                                order_number: order.order_number.clone(),
                                attempts: attempt,
                            })
                            .into());
                        }
                    }
                    SubmissionState::Submitting { attempt: attempt + 1 }
                }
                SubmissionState::Succeeded { attempts } => return Ok(attempts),
            };
        }
    }

    async fn store_receipt<D, R>(
        &self,
        driver: &D,
        renderer: &R,
        order: &OrderRecord,
    ) -> Result<ReceiptArtifact>
    where
        D: FormDriver + ?Sized,
        R: DocumentRenderer + ?Sized,
    {
        let markup = driver.inner_html(RECEIPT).await?;
        self.receipt_builder
            .render_receipt(renderer, &markup, &order.order_number)
            .await
    }
}

/// 填写表单：头部、身体、腿部编号、地址
async fn fill_form<D: FormDriver + ?Sized>(
    driver: &D,
    order: &OrderRecord,
    ctx: &OrderCtx,
) -> Result<()> {
    match resolve_head(&order.head) {
        Some(label) => driver.select_option(HEAD_SELECT, label).await?,
        None => warn!(
            "{} 未知的头部编号 {:?}（已知: {}），跳过选择",
            ctx,
            order.head,
            known_codes().collect::<Vec<_>>().join(", ")
        ),
    }
    driver.click(&body_selector(&order.body)).await?;
    driver.fill(LEGS_INPUT, &order.legs).await?;
    driver.fill(ADDRESS_INPUT, &order.address).await?;
    Ok(())
}

/// 成功标记是否出现
async fn probe_outcome<D: FormDriver + ?Sized>(driver: &D) -> Result<SubmissionOutcome> {
    Ok(match driver.query_optional(SUCCESS_MARKER).await? {
        Some(_) => SubmissionOutcome::Success,
        None => SubmissionOutcome::Failure,
    })
}

/// 关闭页面上的提示弹窗
pub async fn dismiss_modal<D: FormDriver + ?Sized>(driver: &D) -> Result<()> {
    driver.click_text(MODAL_ACCEPT_TEXT).await
}
