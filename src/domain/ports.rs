use crate::domain::model::GenerationConfig;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 文字生成後端。任何傳輸或供應商錯誤都以 `Err` 回傳，由呼叫端決定是否改用備援。
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        generation: &GenerationConfig,
    ) -> Result<String>;
}

/// 架構文件（PDF）來源
#[async_trait]
pub trait ArchitectureDoc: Send + Sync {
    async fn load(&self) -> Result<Vec<u8>>;
}
