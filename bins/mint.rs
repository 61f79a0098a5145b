//! Mint new item identifiers into the record store.
//!
//! Usage: `mint [COUNT]`. Prints `identifier<TAB>lookup-url` per minted record;
//! the URL is what goes into the printed QR code.

use anyhow::Context;
use dotenvy::dotenv;
use service::{minting, runtime, storage::CsvRecordStore};
use tracing::info;

fn parse_count() -> anyhow::Result<usize> {
    match std::env::args().nth(1) {
        None => Ok(1),
        Some(raw) => raw
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .with_context(|| format!("COUNT must be a positive integer, got {raw:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let count = parse_count()?;
    let cfg = configs::AppConfig::load_and_validate()?;
    runtime::ensure_env(&cfg.store.path).await?;
    let store = CsvRecordStore::open(&cfg.store.path)
        .await
        .with_context(|| format!("opening {}", cfg.store.path.display()))?;

    let today = chrono::Utc::now().date_naive();
    for _ in 0..count {
        let record = minting::mint(store.as_ref(), today).await?;
        println!("{}\t{}", record.identifier(), minting::lookup_url(&cfg.mint.base_url, record.identifier()));
    }
    info!(count, store = %cfg.store.path.display(), "minting finished");
    Ok(())
}
