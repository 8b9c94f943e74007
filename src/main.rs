use autoprice::app::cors::CorsPolicy;
use autoprice::utils::error::ErrorSeverity;
use autoprice::utils::{logger, monitor::SystemMonitor, validation::Validate};
use autoprice::{AppState, CliConfig, ServiceError};
use clap::Parser;
use tokio::net::TcpListener;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn exit_with(e: &ServiceError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            exit_with(&e);
        }
    };

    // 初始化日誌
    if config.monitoring.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting autoprice");
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        exit_with(&e);
    }

    let monitor = SystemMonitor::new(config.monitoring.system_stats);
    if monitor.is_enabled() {
        tracing::info!("🔍 System monitoring enabled");
    }

    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => exit_with(&e),
    };
    monitor.log_stats("Artifacts loaded");

    let listener = match TcpListener::bind(config.server.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => exit_with(&ServiceError::IoError(e)),
    };

    let app = autoprice::router(state, CorsPolicy::new(&config.server.allowed_origin));
    tracing::info!("CORS allowed origin: {}", config.server.allowed_origin);

    autoprice::serve(listener, app, shutdown_signal()).await?;

    monitor.log_final_stats();
    Ok(())
}
