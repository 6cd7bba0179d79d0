//! File checkpoint per stage

use crate::error::{FlowError, Result};
use std::path::{Path, PathBuf};

/// Stage results stored as files in one directory.
///
/// A readable file means the stage already ran. Unreadable files are
/// treated as missing so the stage runs again.
#[derive(Debug, Clone)]
pub struct StageCache {
    dir: PathBuf,
    fresh: bool,
}

impl StageCache {
    /// With `fresh`, lookups always miss but results are still written
    pub fn new(dir: impl Into<PathBuf>, fresh: bool) -> Self {
        Self {
            dir: dir.into(),
            fresh,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Cached content of `file_name`, if usable
    pub async fn load(&self, file_name: &str) -> Option<String> {
        if self.fresh {
            return None;
        }
        let path = self.path(file_name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return None;
        }
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                tracing::info!(path = %path.display(), "Found existing stage results");
                Some(content)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load existing stage results, running stage"
                );
                None
            }
        }
    }

    /// Write `content`, creating the directory when missing
    pub async fn store(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| FlowError::CacheWrite {
                path: self.dir.clone(),
                source,
            })?;
        let path = self.path(file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| FlowError::CacheWrite {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Saved stage results");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StageCache::new(dir.path().join("report"), false);

        assert_eq!(cache.load("stock.json").await, None);
        let path = cache.store("stock.json", "{\"a\":1}").await.unwrap();
        assert_eq!(path, dir.path().join("report").join("stock.json"));
        assert_eq!(cache.load("stock.json").await.as_deref(), Some("{\"a\":1}"));
    }

    #[tokio::test]
    async fn test_fresh_ignores_existing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("etf.json"), "old").unwrap();

        let cache = StageCache::new(dir.path(), true);
        assert_eq!(cache.load("etf.json").await, None);
        cache.store("etf.json", "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("etf.json")).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_unreadable_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        // A directory under the cache file name cannot be read as text
        std::fs::create_dir(dir.path().join("crypto.json")).unwrap();

        let cache = StageCache::new(dir.path(), false);
        assert_eq!(cache.load("crypto.json").await, None);
    }
}
