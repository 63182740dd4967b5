use clap::Parser;
use sked_aixm::app::run_server;
use sked_aixm::utils::{error::ErrorSeverity, logger, validation::Validate};
use sked_aixm::{AppState, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting sked-aixm v{}", env!("CARGO_PKG_VERSION"));

    // 載入並驗證配置；缺少 API 金鑰時不提供服務
    let config = match cli.load_service_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!(
        "🔧 Primary model: {}, fallback model: {}",
        config.backend.primary.model,
        config.backend.fallback.model
    );

    let state = AppState::from_config(&config)?;

    if let Err(e) = run_server(state, &config.bind_address()).await {
        tracing::error!(
            "❌ Server failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Critical => 3,
            _ => 1,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}
