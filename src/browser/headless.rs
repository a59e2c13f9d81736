use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{AppError, BrowserError};

/// 启动无头浏览器并打开一个空白页面
pub async fn launch_browser(config: &Config) -> Result<(Browser, Page)> {
    info!("🚀 启动无头浏览器...");

    let mut builder = BrowserConfig::builder().new_headless_mode();
    if let Some(executable) = &config.chrome_executable {
        builder = builder.chrome_executable(Path::new(executable));
    }

    let browser_config = builder
        .args(vec![
            "--disable-gpu",
            "--no-sandbox",
            "--disable-dev-shm-usage",
        ])
        .build()
        .map_err(|reason| {
            error!("配置浏览器失败: {}", reason);
            AppError::Browser(BrowserError::LaunchFailed { reason })
        })?;

    let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        AppError::Browser(BrowserError::LaunchFailed {
            reason: e.to_string(),
        })
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| AppError::navigation_failed("about:blank", e))?;
    info!("✅ 浏览器已启动");

    Ok((browser, page))
}

/// 打开一个空白页面，专门用于把回执 HTML 渲染成 PDF
pub async fn open_render_page(browser: &Browser) -> Result<Page> {
    let page = browser.new_page("about:blank").await?;
    debug!("渲染页面已创建");
    Ok(page)
}
