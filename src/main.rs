use anyhow::Result;
use robot_order_submit::utils::logging;
use robot_order_submit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    app.run_and_shutdown().await?;

    Ok(())
}
