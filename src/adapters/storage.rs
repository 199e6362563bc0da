use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolves relative paths against the working directory.
    pub fn current_dir() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        // 絕對路徑會取代 base_path
        let full_path = Path::new(&self.base_path).join(path);
        tracing::debug!("Reading {}", full_path.display());
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }
}
