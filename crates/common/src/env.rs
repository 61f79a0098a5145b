//! Environment/runtime helpers
//!
//! Sanity checks to ensure the record store has somewhere to live at startup.

use std::path::Path;

use tracing::{info, warn};

/// Ensure the directory holding the backing store exists, creating it if needed.
pub async fn ensure_env(store_path: &Path) -> anyhow::Result<()> {
    let Some(data_dir) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(data_dir).await.is_err() {
        warn!(data_dir = %data_dir.display(), "store directory not found; creating it");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), "store directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_store_directory() -> anyhow::Result<()> {
        let root = std::env::temp_dir().join(format!("env_check_{}", uuid::Uuid::new_v4()));
        let store = root.join("nested").join("code.csv");
        ensure_env(&store).await?;
        assert!(tokio::fs::metadata(root.join("nested")).await?.is_dir());
        // bare file names have no directory to create
        ensure_env(Path::new("code.csv")).await?;
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
