//! Local knowledge collections backing the RAG tools
//!
//! Each collection is a JSON-lines file `{root}/{collection}.jsonl`, one
//! [`KnowledgeEntry`] per line. Retrieval ranks entries by how many distinct
//! query terms they contain.

use crate::error::{ResearchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One stored passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A query hit with its term-overlap score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub score: usize,
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// File-backed store of knowledge collections
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl KnowledgeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ResearchError::InvalidInput(format!(
                "invalid collection name '{collection}'"
            )));
        }
        Ok(self.root.join(format!("{collection}.jsonl")))
    }

    /// Append a passage to a collection
    pub async fn save(
        &self,
        collection: &str,
        text: &str,
        source: Option<&str>,
    ) -> Result<KnowledgeEntry> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ResearchError::InvalidInput(
                "cannot store empty text".to_string(),
            ));
        }
        let path = self.collection_path(collection)?;
        let entry = KnowledgeEntry {
            id: Uuid::new_v4(),
            text: text.to_string(),
            source: source.map(str::to_string),
            created_at: Utc::now(),
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        tokio::fs::create_dir_all(&self.root).await?;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(collection, id = %entry.id, "Stored knowledge entry");
        Ok(entry)
    }

    /// All entries of a collection in insertion order.
    ///
    /// A missing collection is empty. Malformed lines are skipped.
    pub async fn entries(&self, collection: &str) -> Result<Vec<KnowledgeEntry>> {
        let path = self.collection_path(collection)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for (number, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<KnowledgeEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(collection, line = number + 1, error = %e, "Skipping malformed knowledge entry");
                }
            }
        }
        Ok(entries)
    }

    /// Best `limit` entries for `query`, newest first among equal scores
    pub async fn query(&self, collection: &str, query: &str, limit: usize) -> Result<Vec<ScoredEntry>> {
        let terms = tokens(query);
        if terms.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredEntry> = self
            .entries(collection)
            .await?
            .into_iter()
            .filter_map(|entry| {
                let score = tokens(&entry.text).intersection(&terms).count();
                (score > 0).then_some(ScoredEntry { entry, score })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.entry.created_at.cmp(&a.entry.created_at))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    /// Drop entries older than `max_age`, returning how many were removed
    pub async fn prune(&self, collection: &str, max_age: chrono::Duration) -> Result<usize> {
        let path = self.collection_path(collection)?;
        let _guard = self.write_lock.lock().await;

        let cutoff = Utc::now().checked_sub_signed(max_age).ok_or_else(|| {
            ResearchError::InvalidInput(format!("retention of {max_age} is out of range"))
        })?;
        let entries = self.entries(collection).await?;
        let before = entries.len();
        let kept: Vec<&KnowledgeEntry> = entries.iter().filter(|e| e.created_at >= cutoff).collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let mut body = String::new();
        for entry in kept {
            body.push_str(&serde_json::to_string(entry)?);
            body.push('\n');
        }
        tokio::fs::write(&path, body).await?;
        tracing::info!(collection, removed, "Pruned outdated knowledge");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_query_ranks_by_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());

        store
            .save("finwiz-stock", "Apple reported record iPhone revenue", None)
            .await
            .unwrap();
        store
            .save("finwiz-stock", "Apple services revenue and iPhone margins grew", Some("10-Q"))
            .await
            .unwrap();
        store
            .save("finwiz-stock", "Microsoft Azure growth slowed", None)
            .await
            .unwrap();

        let hits = store
            .query("finwiz-stock", "iPhone margins at Apple", 5)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, 3);
        assert_eq!(hits[0].entry.source.as_deref(), Some("10-Q"));
        assert!(dir.path().join("finwiz-stock.jsonl").exists());
    }

    #[tokio::test]
    async fn test_missing_collection_and_blank_text() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());

        assert!(store.entries("finwiz-etf").await.unwrap().is_empty());
        assert!(matches!(
            store.save("finwiz-etf", "   ", None).await,
            Err(ResearchError::InvalidInput(_))
        ));
        assert!(store.save("../escape", "text", None).await.is_err());
    }

    #[tokio::test]
    async fn test_malformed_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.save("finwiz-crypto", "Bitcoin halving", None).await.unwrap();
        let path = dir.path().join("finwiz-crypto.jsonl");
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str("not json\n");
        std::fs::write(&path, content).unwrap();

        assert_eq!(store.entries("finwiz-crypto").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_prune_removes_old_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.save("finwiz-report", "fresh note", None).await.unwrap();

        let old = KnowledgeEntry {
            id: Uuid::new_v4(),
            text: "stale note".to_string(),
            source: None,
            created_at: Utc::now() - chrono::Duration::days(45),
        };
        let path = dir.path().join("finwiz-report.jsonl");
        let mut content = std::fs::read_to_string(&path).unwrap();
        content.push_str(&serde_json::to_string(&old).unwrap());
        content.push('\n');
        std::fs::write(&path, content).unwrap();

        let removed = store
            .prune("finwiz-report", chrono::Duration::days(30))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        let left = store.entries("finwiz-report").await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text, "fresh note");
    }

    #[tokio::test]
    async fn test_prune_rejects_out_of_range_age() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnowledgeStore::new(dir.path());
        store.save("finwiz-stock", "Apple guidance", None).await.unwrap();

        let result = store
            .prune("finwiz-stock", chrono::Duration::days(200_000_000))
            .await;
        assert!(matches!(result, Err(ResearchError::InvalidInput(_))));
        assert_eq!(store.entries("finwiz-stock").await.unwrap().len(), 1);
    }
}
