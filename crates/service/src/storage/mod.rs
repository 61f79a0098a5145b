//! Storage abstractions for the service layer
//!
//! The record store persists the whole table on every change, so every
//! mutation goes through [`RecordStore::update`], which holds the store's
//! guard across load, mutate and save.

pub mod csv_store;

use async_trait::async_trait;
use models::RecordTable;

use crate::errors::ServiceError;

pub use csv_store::CsvRecordStore;

/// Edits a loaded table in place; returns whether the table must be persisted.
pub type Mutation<'a> = Box<dyn FnOnce(&mut RecordTable) -> Result<bool, ServiceError> + Send + 'a>;

/// Trait abstraction for the item record table.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create the backing store with just a header if it does not exist yet.
    async fn ensure_initialized(&self) -> Result<(), ServiceError>;

    /// Read every record. A store that does not exist yet reads as empty.
    async fn load_all(&self) -> Result<RecordTable, ServiceError>;

    /// Replace the persisted table with `table`, in its iteration order.
    async fn save_all(&self, table: &RecordTable) -> Result<(), ServiceError>;

    /// Load, mutate and (if the mutation asks for it) save, exclusively.
    async fn update<'a>(&'a self, mutation: Mutation<'a>) -> Result<(), ServiceError>;
}
