//! Typed item records and the ordered table the record store persists.

pub mod errors;
pub mod columns;
pub mod record;
pub mod table;

pub use record::ItemRecord;
pub use table::RecordTable;
