use crate::config::service_config::ServiceConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "sked-aixm")]
#[command(about = "Converts aeronautical schedule text into AIXM 5.1.1 timeInterval XML")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override server.host
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port
    #[arg(long)]
    pub port: Option<u16>,

    /// Generation backend API key. Takes precedence over backend.api_key in the
    /// config file, which in turn takes precedence over GEMINI_API_KEY.
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// 載入設定檔（或預設值）並套用命令列覆蓋
    pub fn load_service_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                ServiceConfig::from_file(path)?
            }
            None => ServiceConfig::from_env(),
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(key) = &self.api_key {
            config.backend.api_key = Some(key.clone());
        }

        Ok(config)
    }
}
