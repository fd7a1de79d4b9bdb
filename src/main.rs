use upload_relay::startup::run_startup_checks;
use upload_relay::{AppConfig, AppState, ShutdownManager, build_app};

#[tokio::main]
async fn main() {
    // 日志级别来自配置，因此先加载配置；此时 subscriber 尚未安装，失败信息直接写 stderr
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config load failed: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "upload_relay={level},tower_http={level},error_report=info",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .init();
    tracing::info!(
        "配置已加载，配置文件 {:?}（不存在时使用默认值与环境变量）",
        AppConfig::config_path()
    );

    if let Err(e) = run_startup_checks(&config) {
        tracing::error!("Startup checks failed: {}", e);
        std::process::exit(1);
    }

    let shutdown_manager = ShutdownManager::new();
    if let Err(e) = shutdown_manager.start_signal_handler().await {
        tracing::error!("信号处理器启动失败: {}", e);
        std::process::exit(1);
    }

    let addr = config.server_addr();
    let shutdown_timeout = config.shutdown.timeout_duration();

    let state = match AppState::new(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("AppState init failed: {}", e);
            std::process::exit(1);
        }
    };
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Bind address failed {}: {}", addr, e);
            std::process::exit(1);
        });

    tracing::info!("Server Listening on http://{}", addr);
    tracing::info!("Upload: POST http://{}/upload", addr);
    tracing::info!("Docs: http://{}/docs", addr);

    let signal_manager = shutdown_manager.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let reason = signal_manager.wait_for_shutdown().await;
        tracing::info!("接收到退出信号: {:?}，开始优雅关闭HTTP服务器...", reason);
    });

    // 收到信号后最多等待 shutdown_timeout 让在途请求（含挂起的上游调用）结束
    let server = tokio::spawn(async move { server.await });
    let drained = async {
        shutdown_manager.wait_for_shutdown().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        res = server => match res {
            Ok(Ok(())) => tracing::info!("服务器已优雅关闭"),
            Ok(Err(e)) => {
                tracing::error!("服务器运行错误: {}", e);
                std::process::exit(1);
            }
            Err(e) => {
                tracing::error!("服务器任务异常退出: {}", e);
                std::process::exit(1);
            }
        },
        _ = drained => {
            tracing::warn!("优雅退出超时（{}s），强制退出", shutdown_timeout.as_secs());
        }
    }
}
