//! Durable JSON-file store
//!
//! One file per origin under a root directory. Writes are atomic: the map is
//! written to `<file>.tmp` and renamed over the live file.

use crate::error::StoreError;
use crate::store::Store;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Origin-scoped store persisted as a JSON object
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<IndexMap<String, String>>,
}

impl FileStore {
    /// Open (or create) the store for `origin` under `root`
    ///
    /// # Errors
    /// - `StoreError::Io` if the directory or file cannot be read
    /// - `StoreError::Corrupt` if the file is not a string map
    pub async fn open(root: impl AsRef<Path>, origin: &str) -> Result<Self, StoreError> {
        let root = root.as_ref();
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| StoreError::io_error(root, e))?;

        let path = root.join(format!("{}.json", origin_file_stem(origin)));
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => IndexMap::new(),
            Err(e) => return Err(StoreError::io_error(&path, e)),
        };

        tracing::debug!("Opened store {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &IndexMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json)
            .await
            .map_err(|e| StoreError::io_error(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StoreError::io_error(&self.path, e))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value.to_string());
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().await.keys().cloned().collect())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.shift_remove(key);
        self.persist(&updated).await?;
        *entries = updated;
        Ok(())
    }
}

/// File-name-safe form of an origin (`https://a.b:8080` → `https_3a_2f_2fa.b_3a8080`)
///
/// Bytes outside `[A-Za-z0-9.-]` become `_xx` (lowercase hex), `_` included,
/// so distinct origins never share a file.
fn origin_file_stem(origin: &str) -> String {
    if origin.is_empty() {
        return "_".to_string();
    }
    let mut stem = String::with_capacity(origin.len());
    for byte in origin.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("_{byte:02x}"));
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_stems() {
        assert_eq!(origin_file_stem("https://a.b:8080"), "https_3a_2f_2fa.b_3a8080");
        assert_eq!(origin_file_stem("a_b"), "a_5fb");
        assert_eq!(origin_file_stem(""), "_");
    }

    #[test]
    fn distinct_origins_get_distinct_stems() {
        let origins = ["a:b", "a/b", "a_b", "a_3ab", "", "_"];
        let stems: std::collections::HashSet<_> =
            origins.iter().map(|o| origin_file_stem(o)).collect();
        assert_eq!(stems.len(), origins.len());
    }

    #[tokio::test]
    async fn failed_set_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "o").await.unwrap();
        tokio::fs::create_dir(dir.path().join("o.json.tmp")).await.unwrap();

        assert!(store.set("k", "v").await.is_err());
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_remove_keeps_entry() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "o").await.unwrap();
        store.set("k", "v").await.unwrap();
        tokio::fs::create_dir(dir.path().join("o.json.tmp")).await.unwrap();

        assert!(store.remove("k").await.is_err());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::fs::remove_dir(dir.path().join("o.json.tmp")).await.unwrap();
        let reopened = FileStore::open(dir.path(), "o").await.unwrap();
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path(), "https://example.com").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("a", "1").await.unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path(), "https://example.com").await.unwrap();
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(reopened.keys().await.unwrap(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn origins_are_isolated() {
        let dir = tempfile::tempdir().unwrap();

        let a = FileStore::open(dir.path(), "https://a.example").await.unwrap();
        let b = FileStore::open(dir.path(), "https://b.example").await.unwrap();
        a.set("k", "from-a").await.unwrap();

        assert_eq!(b.get("k").await.unwrap(), None);
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn remove_persists() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path(), "o").await.unwrap();
        store.set("k", "v").await.unwrap();
        store.remove("k").await.unwrap();
        drop(store);

        let reopened = FileStore::open(dir.path(), "o").await.unwrap();
        assert!(reopened.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("o.json"), "not json").await.unwrap();

        let result = FileStore::open(dir.path(), "o").await;
        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
    }
}
