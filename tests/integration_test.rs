use robot_order_submit::browser::{connect_to_browser, launch_browser};
use robot_order_submit::error::{AppError, BrowserError};
use robot_order_submit::config::Config;
use robot_order_submit::services::order_source::{download_orders, read_orders};
use robot_order_submit::utils::logging;
use robot_order_submit::App;

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_full_run_against_live_site() {
    logging::init(true);

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let config = Config {
        output_dir: dir.path().join("output").display().to_string(),
        archive_path: dir.path().join("merged.zip").display().to_string(),
        orders_file: dir.path().join("orders.csv").display().to_string(),
        ..Config::load().expect("加载配置失败")
    };

    let app = App::initialize(config).await.expect("初始化失败");
    let result = app.run().await;
    app.shutdown().await.expect("关闭浏览器失败");

    let summary = result.expect("运行失败");
    assert!(!summary.receipts.is_empty());
    assert!(dir.path().join("merged.zip").exists());
}

#[tokio::test]
#[ignore]
async fn test_browser_launch() {
    logging::init(false);

    let config = Config::load().expect("加载配置失败");
    let result = launch_browser(&config).await;

    assert!(result.is_ok(), "应该能够成功启动浏览器");
}

#[tokio::test]
#[ignore]
async fn test_download_orders() {
    logging::init(false);

    let config = Config::load().expect("加载配置失败");
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let dest = dir.path().join("orders.csv");

    download_orders(&config.orders_url, &dest)
        .await
        .expect("下载订单失败");
    let orders = read_orders(&dest).expect("读取订单失败");

    println!("找到 {} 个订单", orders.len());
    assert!(!orders.is_empty());
}

#[tokio::test]
async fn test_connect_without_debug_port_fails() {
    // 端口 1 上没有浏览器在监听
    let err = match connect_to_browser(1).await {
        Ok(_) => panic!("不应连接成功"),
        Err(e) => e,
    };

    match err.downcast_ref::<AppError>() {
        Some(AppError::Browser(BrowserError::ConnectionFailed { port, .. })) => {
            assert_eq!(*port, 1);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
