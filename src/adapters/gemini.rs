use crate::config::BackendConfig;
use crate::domain::model::{GenerationConfig, SafetySetting};
use crate::domain::ports::GenerationBackend;
use crate::utils::error::{Result, SkedError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini `generateContent` REST 介面
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: WireGenerationConfig,
    #[serde(skip_serializing_if = "no_safety_settings")]
    safety_settings: &'a [SafetySetting],
}

fn no_safety_settings(settings: &&[SafetySetting]) -> bool {
    settings.is_empty()
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for WireGenerationConfig {
    fn from(generation: &GenerationConfig) -> Self {
        Self {
            temperature: generation.temperature,
            top_p: generation.top_p,
            top_k: generation.top_k,
            max_output_tokens: generation.max_output_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiBackend {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.api_key()?,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        generation: &GenerationConfig,
    ) -> Result<String> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: generation.into(),
            safety_settings: &generation.safety_settings,
        };

        tracing::debug!("Making generateContent request to model: {}", model);
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        tracing::debug!("Backend response status: {}", response.status());

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SkedError::BackendStatusError {
                model: model.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response.json().await?;

        if let Some(reason) = payload.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(SkedError::BackendBlockedError {
                model: model.to_string(),
                reason,
            });
        }

        let Some(candidate) = payload.candidates.into_iter().next() else {
            return Err(SkedError::EmptyResponseError {
                model: model.to_string(),
            });
        };

        // 非 STOP（MAX_TOKENS、SAFETY、RECITATION…）代表內容不完整，交給備援層處理
        if let Some(reason) = candidate.finish_reason {
            if reason != "STOP" && reason != "FINISH_REASON_UNSPECIFIED" {
                tracing::warn!("⚠️ {} finished with reason {}", model, reason);
                return Err(SkedError::TruncatedResponseError {
                    model: model.to_string(),
                    reason,
                });
            }
        }

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SkedError::EmptyResponseError {
                model: model.to_string(),
            });
        }

        Ok(text)
    }
}
