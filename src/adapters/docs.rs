use crate::domain::ports::ArchitectureDoc;
use crate::utils::error::{Result, SkedError};
use async_trait::async_trait;
use std::path::PathBuf;

/// 從磁碟讀取預先產生好的架構文件 PDF
#[derive(Debug, Clone)]
pub struct FileArchitectureDoc {
    path: PathBuf,
}

impl FileArchitectureDoc {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArchitectureDoc for FileArchitectureDoc {
    async fn load(&self) -> Result<Vec<u8>> {
        tracing::info!("📄 Reading architecture document: {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        if data.is_empty() {
            return Err(SkedError::ValidationError {
                message: format!("architecture document {} is empty", self.path.display()),
            });
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_existing_document() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"%PDF-1.4\n%%EOF\n").unwrap();

        let doc = FileArchitectureDoc::new(temp_file.path());
        let data = doc.load().await.unwrap();
        assert!(data.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_missing_document_is_an_error() {
        let doc = FileArchitectureDoc::new("/nonexistent/architecture.pdf");
        assert!(matches!(doc.load().await, Err(SkedError::IoError(_))));
    }

    #[tokio::test]
    async fn test_empty_document_is_an_error() {
        let temp_file = NamedTempFile::new().unwrap();
        let doc = FileArchitectureDoc::new(temp_file.path());
        assert!(doc.load().await.is_err());
    }
}
