use serde::{Deserialize, Serialize};

use crate::domain::contract::NormalizationContract;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub aixm_xml: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// 單一危害類別的封鎖門檻，例如 `HARM_CATEGORY_HARASSMENT` / `BLOCK_NONE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

impl SafetySetting {
    pub fn new(category: impl Into<String>, threshold: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            threshold: threshold.into(),
        }
    }

    /// 班表文字不含敏感內容，四個類別都不封鎖
    pub fn block_none() -> Vec<Self> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| Self::new(category, "BLOCK_NONE"))
        .collect()
    }
}

/// 取樣參數。`top_p` / `top_k` 為 `None`、`safety_settings` 為空時不送出，由後端使用預設值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: u32,
    #[serde(default)]
    pub safety_settings: Vec<SafetySetting>,
}

impl GenerationConfig {
    pub fn primary_default() -> Self {
        Self {
            temperature: 0.2,
            top_p: Some(0.95),
            top_k: Some(40),
            max_output_tokens: 2048,
            safety_settings: SafetySetting::block_none(),
        }
    }

    pub fn fallback_default() -> Self {
        Self {
            temperature: 0.2,
            top_p: None,
            top_k: None,
            max_output_tokens: 2048,
            safety_settings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendTier {
    Primary,
    Fallback,
}

impl std::fmt::Display for BackendTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendTier::Primary => write!(f, "primary"),
            BackendTier::Fallback => write!(f, "fallback"),
        }
    }
}

/// 一個固定的後端呼叫設定：模型、取樣參數與使用的指令合約。
#[derive(Debug, Clone, PartialEq)]
pub struct BackendInvocation {
    pub tier: BackendTier,
    pub model: String,
    pub generation: GenerationConfig,
    pub contract: NormalizationContract,
}

impl BackendInvocation {
    pub fn primary(model: impl Into<String>, generation: GenerationConfig) -> Self {
        Self {
            tier: BackendTier::Primary,
            model: model.into(),
            generation,
            contract: NormalizationContract::Detailed,
        }
    }

    pub fn fallback(model: impl Into<String>, generation: GenerationConfig) -> Self {
        Self {
            tier: BackendTier::Fallback,
            model: model.into(),
            generation,
            contract: NormalizationContract::Minimal,
        }
    }
}
