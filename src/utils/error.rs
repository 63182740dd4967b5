use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkedError {
    #[error("Backend request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Backend '{model}' returned HTTP {status}: {body}")]
    BackendStatusError {
        model: String,
        status: u16,
        body: String,
    },

    #[error("Backend '{model}' blocked the prompt: {reason}")]
    BackendBlockedError { model: String, reason: String },

    #[error("Backend '{model}' stopped before completing the response: {reason}")]
    TruncatedResponseError { model: String, reason: String },

    #[error("Backend '{model}' returned an empty response")]
    EmptyResponseError { model: String },

    #[error("Both primary and fallback backends failed: {message}")]
    GenerationFailedError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, SkedError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Backend,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SkedError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SkedError::ConfigError { .. }
            | SkedError::MissingConfigError { .. }
            | SkedError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            SkedError::ApiError(_)
            | SkedError::BackendStatusError { .. }
            | SkedError::BackendBlockedError { .. }
            | SkedError::TruncatedResponseError { .. }
            | SkedError::EmptyResponseError { .. }
            | SkedError::GenerationFailedError { .. } => ErrorCategory::Backend,
            SkedError::ValidationError { .. } => ErrorCategory::Input,
            SkedError::IoError(_) | SkedError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Backend => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// 給操作人員的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SkedError::MissingConfigError { .. } => {
                "Set GEMINI_API_KEY (or backend.api_key in the config file) before starting"
            }
            SkedError::ConfigError { .. } | SkedError::InvalidConfigValueError { .. } => {
                "Check the configuration file and command line overrides"
            }
            SkedError::ApiError(_) | SkedError::BackendStatusError { .. } => {
                "Check network access to the generation backend and the API key quota"
            }
            SkedError::BackendBlockedError { .. } => {
                "Rephrase the schedule text; the backend refused the prompt"
            }
            SkedError::TruncatedResponseError { .. } => {
                "Raise max_output_tokens for the model or shorten the schedule text"
            }
            SkedError::EmptyResponseError { .. } | SkedError::GenerationFailedError { .. } => {
                "Retry the request later; both generation backends are unavailable"
            }
            SkedError::ValidationError { .. } => "Provide non-empty schedule text",
            SkedError::IoError(_) | SkedError::SerializationError(_) => {
                "Check file permissions and disk state"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Backend => format!("Schedule conversion failed: {}", self),
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}
