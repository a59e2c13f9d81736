pub mod connection;
pub mod headless;

pub use connection::connect_to_browser;
pub use headless::launch_browser;

use anyhow::Result;
use chromiumoxide::{Browser, Page};

use crate::config::Config;

/// 按配置启动新浏览器或连接已打开的浏览器，返回一个可用页面
pub async fn open_browser(config: &Config) -> Result<(Browser, Page)> {
    if config.headless {
        launch_browser(config).await
    } else {
        connect_to_browser(config.browser_debug_port).await
    }
}
