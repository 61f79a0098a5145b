//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the store's directory exists before the store is initialised.
pub async fn ensure_env(store_path: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(store_path).await
}
