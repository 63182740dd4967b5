use clap::Parser;
use sked_aixm::utils::error::ErrorSeverity;
use sked_aixm::utils::{logger, validation::Validate};
use sked_aixm::ServiceConfig;
use sked_aixm::{adapters::GeminiBackend, ResilientInvoker};
use std::io::Read;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sked-convert")]
#[command(about = "Convert one schedule description to AIXM 5.1.1 XML and print it")]
struct Args {
    /// Schedule text; read from stdin when omitted
    text: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Generation backend API key; overrides the config file and GEMINI_API_KEY
    #[arg(long)]
    api_key: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let mut config = match &args.config {
        Some(path) => match ServiceConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("💡 Make sure the file exists and is valid TOML format");
                std::process::exit(1);
            }
        },
        None => ServiceConfig::from_env(),
    };
    if let Some(key) = args.api_key {
        config.backend.api_key = Some(key);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let text = if args.text.is_empty() {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        args.text.join(" ")
    };

    let backend = GeminiBackend::from_config(&config.backend)?;
    let invoker = ResilientInvoker::from_config(Arc::new(backend), &config.backend);

    match invoker.convert(&text).await {
        Ok(result) => {
            println!("{}", result.aixm_xml);
            if let Some(note) = result.note {
                eprintln!("ℹ️ {}", note);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Conversion failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 4,      // 輸入錯誤
                ErrorSeverity::Medium => 2,   // 後端錯誤，可重試
                ErrorSeverity::High => 1,     // 處理錯誤
                ErrorSeverity::Critical => 3, // 設定錯誤
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
