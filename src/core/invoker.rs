use std::sync::Arc;

use crate::config::BackendConfig;
use crate::core::cleanup::{cleanup, inspect_fragment};
use crate::domain::model::{BackendInvocation, ConversionResult};
use crate::domain::ports::GenerationBackend;
use crate::utils::error::{Result, SkedError};
use crate::utils::validation::validate_non_empty_string;

/// 主要 / 備援兩層的生成呼叫。
///
/// 主要模型失敗（傳輸錯誤、供應商錯誤、截斷或空回應）時改用備援模型與精簡合約重試一次；
/// 備援也失敗則整個請求失敗，不回傳部分結果。
pub struct ResilientInvoker {
    backend: Arc<dyn GenerationBackend>,
    primary: BackendInvocation,
    fallback: BackendInvocation,
}

impl ResilientInvoker {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        primary: BackendInvocation,
        fallback: BackendInvocation,
    ) -> Self {
        Self {
            backend,
            primary,
            fallback,
        }
    }

    pub fn from_config(backend: Arc<dyn GenerationBackend>, config: &BackendConfig) -> Self {
        Self::new(backend, config.primary_invocation(), config.fallback_invocation())
    }

    pub async fn convert(&self, text: &str) -> Result<ConversionResult> {
        validate_non_empty_string("text", text).map_err(|_| SkedError::ValidationError {
            message: "schedule text must not be empty".to_string(),
        })?;

        match self.invoke(&self.primary, text).await {
            Ok(aixm_xml) => Ok(ConversionResult {
                aixm_xml,
                note: None,
            }),
            Err(primary_error) => {
                tracing::warn!(
                    "⚠️ Error with primary model {}: {}",
                    self.primary.model,
                    primary_error
                );
                tracing::info!("🔄 Attempting fallback to {} model", self.fallback.model);

                let aixm_xml = self.invoke(&self.fallback, text).await.map_err(|fallback_error| {
                    tracing::error!(
                        "❌ Fallback model {} failed: {}",
                        self.fallback.model,
                        fallback_error
                    );
                    SkedError::GenerationFailedError {
                        message: format!(
                            "primary {}: {}; fallback {}: {}",
                            self.primary.model, primary_error, self.fallback.model, fallback_error
                        ),
                    }
                })?;

                Ok(ConversionResult {
                    aixm_xml,
                    note: Some(format!(
                        "Generated using fallback model ({})",
                        self.fallback.model
                    )),
                })
            }
        }
    }

    async fn invoke(&self, invocation: &BackendInvocation, text: &str) -> Result<String> {
        let prompt = invocation.contract.render(text);
        tracing::debug!(
            "📡 {} model {} with contract {} ({} chars)",
            invocation.tier,
            invocation.model,
            invocation.contract.version(),
            prompt.len()
        );

        let raw = self
            .backend
            .generate(&invocation.model, &prompt, &invocation.generation)
            .await?;

        let aixm_xml = cleanup(&raw);
        if aixm_xml.is_empty() {
            return Err(SkedError::EmptyResponseError {
                model: invocation.model.clone(),
            });
        }

        let report = inspect_fragment(&aixm_xml);
        if !report.is_conformant() {
            tracing::warn!(
                "⚠️ {} output from {} deviates from the fragment shape: {:?}",
                invocation.tier,
                invocation.model,
                report
            );
        } else {
            tracing::debug!(
                "✅ {} produced {} timeInterval element(s)",
                invocation.model,
                report.intervals
            );
        }

        Ok(aixm_xml)
    }
}
