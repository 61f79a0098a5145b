use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use models::{columns, ItemRecord, RecordTable};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::{Mutation, RecordStore};
use crate::errors::{ServiceError, StoreError};

/// CSV file-backed record table.
///
/// Reads resolve legacy column names; writes always emit the canonical header
/// and replace the file atomically (temp file in the same directory, fsync,
/// rename), so readers only ever see a complete old or a complete new table.
pub struct CsvRecordStore {
    path: PathBuf,
    guard: Arc<Mutex<()>>,
}

impl CsvRecordStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into(), guard: Arc::new(Mutex::new(())) }
    }

    /// Initialize the store at `path` and check that it is readable.
    ///
    /// Creates the file with only a header when missing; fails on a corrupt file.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = Self::new(path);
        store.ensure_initialized().await?;
        let table = store.read_table().await?;
        info!(path = %store.path.display(), records = table.len(), "record store opened");
        Ok(Arc::new(store))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> Result<RecordTable, ServiceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => parse_table(&self.path, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RecordTable::new()),
            Err(e) => Err(StoreError::io(&self.path, e).into()),
        }
    }

    /// Write while holding `guard`; the guard is released only once the rename
    /// has happened, even if the calling future is dropped mid-write.
    async fn persist(&self, table: &RecordTable, guard: OwnedMutexGuard<()>) -> Result<(), ServiceError> {
        let bytes = encode_table(table)?;
        let path = self.path.clone();
        let records = table.len();
        tokio::task::spawn_blocking(move || {
            let res = write_atomic(&path, &bytes);
            drop(guard);
            res
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))??;
        debug!(path = %self.path.display(), records, "record store saved");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    async fn ensure_initialized(&self) -> Result<(), ServiceError> {
        let guard = Arc::clone(&self.guard).lock_owned().await;
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        if exists {
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        info!(path = %self.path.display(), "creating empty record store");
        self.persist(&RecordTable::new(), guard).await
    }

    async fn load_all(&self) -> Result<RecordTable, ServiceError> {
        self.read_table().await
    }

    async fn save_all(&self, table: &RecordTable) -> Result<(), ServiceError> {
        let guard = Arc::clone(&self.guard).lock_owned().await;
        self.persist(table, guard).await
    }

    async fn update<'a>(&'a self, mutation: Mutation<'a>) -> Result<(), ServiceError> {
        let guard = Arc::clone(&self.guard).lock_owned().await;
        let mut table = self.read_table().await?;
        if mutation(&mut table)? {
            self.persist(&table, guard).await?;
        }
        Ok(())
    }
}

/// Decode a whole store file.
///
/// Rows without an identifier are skipped. Non-ASCII content or an unparsable
/// scan count means the file cannot be trusted and is reported as corrupt.
pub fn parse_table(path: &Path, bytes: &[u8]) -> Result<RecordTable, ServiceError> {
    if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(StoreError::corrupt(path, format!("non-ASCII byte at offset {offset}")).into());
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|e| StoreError::corrupt(path, e.to_string()))?
        .clone();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        index.entry(name.trim()).or_insert(i);
    }

    let mut table = RecordTable::new();
    for row in reader.records() {
        let row = row.map_err(|e| StoreError::corrupt(path, e.to_string()))?;
        let field = |name: &str| index.get(name).and_then(|&i| row.get(i));
        match ItemRecord::from_row(field).map_err(|e| StoreError::corrupt(path, e.to_string()))? {
            Some(rec) => {
                if let Some(prev) = table.upsert(rec) {
                    debug!(identifier = prev.identifier(), "duplicate identifier; later row wins");
                }
            }
            None => debug!(line = row.position().map(|p| p.line()), "skipping row without identifier"),
        }
    }
    Ok(table)
}

/// Encode a table with the canonical header, one row per record.
pub fn encode_table(table: &RecordTable) -> Result<Vec<u8>, ServiceError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    let csv_err = |e: csv::Error| ServiceError::Validation(format!("cannot encode record: {e}"));
    writer.write_record(columns::HEADER).map_err(csv_err)?;
    for rec in table.iter() {
        writer.write_record(rec.to_row()).map_err(csv_err)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ServiceError::Validation(format!("cannot encode table: {}", e.error())))?;
    if !bytes.is_ascii() {
        return Err(ServiceError::Validation("record text must be 7-bit ASCII".into()));
    }
    Ok(bytes)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
    let tmp_path = tmp.path().to_path_buf();

    // keep whatever permissions the store already had
    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .map_err(|e| StoreError::io(&tmp_path, e))?;
    }
    tmp.write_all(bytes).map_err(|e| StoreError::io(&tmp_path, e))?;
    tmp.as_file().sync_all().map_err(|e| StoreError::io(&tmp_path, e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
