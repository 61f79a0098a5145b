#![cfg(test)]
use std::path::PathBuf;
use std::sync::Arc;

use crate::storage::CsvRecordStore;

/// Fresh directory under the system temp dir, unique per call.
pub fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{prefix}_{}", uuid::Uuid::new_v4()))
}

/// Store path inside a fresh temp directory; nothing is created on disk.
pub fn temp_store_path(prefix: &str) -> PathBuf {
    temp_dir(prefix).join("code.csv")
}

/// Write `content` as the store file and open a store over it.
pub async fn store_with(prefix: &str, content: &str) -> Arc<CsvRecordStore> {
    let path = temp_store_path(prefix);
    tokio::fs::create_dir_all(path.parent().expect("temp path has a parent"))
        .await
        .expect("create temp dir");
    tokio::fs::write(&path, content).await.expect("seed store");
    Arc::new(CsvRecordStore::new(path))
}

pub async fn cleanup(store: &CsvRecordStore) {
    if let Some(dir) = store.path().parent() {
        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
