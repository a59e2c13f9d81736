//! 应用生命周期 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动或连接浏览器，创建下单页面与渲染页面
//! 2. **加载订单**：下载订单 CSV 并按行读取
//! 3. **顺序处理**：委托 pipeline 逐个处理订单并打包
//! 4. **资源管理**：持有 Browser，运行结束后关闭自己启动的浏览器

use std::path::Path;

use anyhow::Result;
use chromiumoxide::Browser;
use tracing::{error, info, warn};

use crate::browser;
use crate::config::Config;
use crate::infrastructure::{ChromeFormDriver, FormDriver, JsExecutor};
use crate::models::{ArtifactLayout, OrderRecord};
use crate::orchestrator::pipeline::{self, RunSummary};
use crate::services::{order_source, ChromePdfRenderer, ZipArchiver};
use crate::utils::logging::{log_orders_loaded, log_startup, print_final_stats};
use crate::workflow::OrderFlow;

/// 应用主结构
pub struct App {
    config: Config,
    browser: Browser,
    driver: ChromeFormDriver,
    renderer: ChromePdfRenderer,
    layout: ArtifactLayout,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let (browser, page) = browser::open_browser(&config).await?;
        let render_page = browser::headless::open_render_page(&browser).await?;

        let driver = ChromeFormDriver::new(JsExecutor::new(page), &config);
        driver.navigate(&config.target_url).await?;
        info!("已打开下单页面: {}", config.target_url);
        let renderer = ChromePdfRenderer::new(render_page);
        let layout = ArtifactLayout::new(&config.output_dir, &config.archive_path);

        Ok(Self {
            config,
            browser,
            driver,
            renderer,
            layout,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        pipeline::prepare_output(&self.layout, self.config.clean_output).await?;

        let orders = self.load_orders().await?;
        if orders.is_empty() {
            warn!("⚠️ 订单文件中没有订单，将直接打包");
        }
        log_orders_loaded(orders.len());

        let flow = OrderFlow::new(&self.config, self.layout.clone());
        let summary = pipeline::run_pipeline(
            &flow,
            &self.driver,
            &self.renderer,
            &ZipArchiver,
            &self.layout,
            &orders,
        )
        .await?;

        print_final_stats(&summary, &self.layout);
        Ok(summary)
    }

    /// 运行后无论成败都关闭浏览器
    ///
    /// 运行失败时返回运行错误，关闭失败只记日志
    pub async fn run_and_shutdown(self) -> Result<RunSummary> {
        let run = self.run().await;
        let shutdown = self.shutdown().await;
        settle(run, shutdown)
    }

    /// 关闭浏览器；连接的是外部浏览器时只断开，不关闭
    pub async fn shutdown(mut self) -> Result<()> {
        if self.config.headless {
            self.browser.close().await?;
            self.browser.wait().await?;
            info!("浏览器已关闭");
        }
        Ok(())
    }

    /// 下载并读取订单
    async fn load_orders(&self) -> Result<Vec<OrderRecord>> {
        info!("\n📁 正在获取订单...");
        let orders_file = Path::new(&self.config.orders_file);
        order_source::download_orders(&self.config.orders_url, orders_file).await?;
        order_source::read_orders(orders_file)
    }
}

/// 合并运行结果与关闭结果，运行错误优先
fn settle(run: Result<RunSummary>, shutdown: Result<()>) -> Result<RunSummary> {
    match (run, shutdown) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(e)) => Err(e),
        (Err(run_err), Ok(())) => Err(run_err),
        (Err(run_err), Err(shutdown_err)) => {
            error!("关闭浏览器失败: {:#}", shutdown_err);
            Err(run_err)
        }
    }
}
