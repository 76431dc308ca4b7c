// ==========================================
// 设备维保管理系统 - HTTP 服务主入口
// ==========================================
// 环境变量: MACHINE_MIND_DB_PATH / MACHINE_MIND_BIND_ADDR / MACHINE_MIND_LOG_FORMAT
// ==========================================

use std::sync::Arc;

use anyhow::Context;
use machine_mind::app::{router, AppState};
use machine_mind::config::AppConfig;
use machine_mind::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();

    // 初始化日志系统
    logging::init(config.log_format);

    tracing::info!("==================================================");
    tracing::info!("{}", machine_mind::APP_NAME);
    tracing::info!("系统版本: {}", machine_mind::VERSION);
    tracing::info!("==================================================");
    tracing::info!("使用数据库: {}", config.db_path);

    let state = AppState::new(config.db_path.clone()).map_err(anyhow::Error::msg)?;
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("无法监听地址: {}", config.bind_addr))?;
    tracing::info!("HTTP 服务已启动: http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP 服务异常退出")?;

    tracing::info!("HTTP 服务已退出");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听退出信号: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在关闭...");
}
