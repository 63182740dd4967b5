use crate::domain::model::{BackendInvocation, GenerationConfig, SafetySetting};
use crate::utils::error::{Result, SkedError};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "ModelProfile::primary_default")]
    pub primary: ModelProfile,
    #[serde(default = "ModelProfile::fallback_default")]
    pub fallback: ModelProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProfile {
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// 未設定時使用該層預設值；`safety_settings = []` 表示不送出
    pub safety_settings: Option<Vec<SafetySetting>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_architecture_pdf")]
    pub architecture_pdf: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_architecture_pdf() -> String {
    "docs/aeronautical_converter_architecture.pdf".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            primary: ModelProfile::primary_default(),
            fallback: ModelProfile::fallback_default(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            architecture_pdf: default_architecture_pdf(),
        }
    }
}

impl ModelProfile {
    pub fn primary_default() -> Self {
        let generation = GenerationConfig::primary_default();
        Self {
            model: "gemini-1.5-pro".to_string(),
            temperature: generation.temperature,
            top_p: generation.top_p,
            top_k: generation.top_k,
            max_output_tokens: generation.max_output_tokens,
            safety_settings: None,
        }
    }

    pub fn fallback_default() -> Self {
        let generation = GenerationConfig::fallback_default();
        Self {
            model: "gemini-2.0-flash-lite".to_string(),
            temperature: generation.temperature,
            top_p: generation.top_p,
            top_k: generation.top_k,
            max_output_tokens: generation.max_output_tokens,
            safety_settings: None,
        }
    }

    pub fn generation(&self, default_safety: &[SafetySetting]) -> GenerationConfig {
        GenerationConfig {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
            safety_settings: self
                .safety_settings
                .clone()
                .unwrap_or_else(|| default_safety.to_vec()),
        }
    }

    fn validate_profile(&self, section: &str) -> Result<()> {
        validate_non_empty_string(&format!("{}.model", section), &self.model)?;
        validate_range(&format!("{}.temperature", section), self.temperature, 0.0, 2.0)?;
        if let Some(top_p) = self.top_p {
            validate_range(&format!("{}.top_p", section), top_p, 0.0, 1.0)?;
        }
        if let Some(top_k) = self.top_k {
            validate_positive_number(&format!("{}.top_k", section), u64::from(top_k), 1)?;
        }
        validate_positive_number(
            &format!("{}.max_output_tokens", section),
            u64::from(self.max_output_tokens),
            1,
        )?;
        for (index, setting) in self.safety_settings.iter().flatten().enumerate() {
            let field = format!("{}.safety_settings[{}]", section, index);
            validate_non_empty_string(&format!("{}.category", field), &setting.category)?;
            validate_non_empty_string(&format!("{}.threshold", field), &setting.threshold)?;
        }
        Ok(())
    }
}

impl BackendConfig {
    /// 取得 API 金鑰；未設定、空字串或未替換的 `${VAR}` 視為缺少
    pub fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !key.starts_with("${") => Ok(key),
            _ => Err(SkedError::MissingConfigError {
                field: format!("backend.api_key ({})", API_KEY_ENV),
            }),
        }
    }

    pub fn primary_invocation(&self) -> BackendInvocation {
        let defaults = GenerationConfig::primary_default().safety_settings;
        BackendInvocation::primary(self.primary.model.clone(), self.primary.generation(&defaults))
    }

    pub fn fallback_invocation(&self) -> BackendInvocation {
        let defaults = GenerationConfig::fallback_default().safety_settings;
        BackendInvocation::fallback(self.fallback.model.clone(), self.fallback.generation(&defaults))
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| SkedError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;
        config.apply_env_api_key();
        Ok(config)
    }

    /// 沒有設定檔時只用預設值與環境變數
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_api_key();
        config
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    fn apply_env_api_key(&mut self) {
        if self.backend.api_key().is_err() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.backend.api_key = Some(key);
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        self.backend.api_key()?;
        validate_url("backend.base_url", &self.backend.base_url)?;
        validate_positive_number("backend.timeout_seconds", self.backend.timeout_seconds, 1)?;
        self.backend.primary.validate_profile("backend.primary")?;
        self.backend.fallback.validate_profile("backend.fallback")?;
        validate_non_empty_string("server.host", &self.server.host)?;
        Ok(())
    }
}
