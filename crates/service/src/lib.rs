//! Service layer for code verification.
//! - `storage`: the durable record table and its read-modify-write guard.
//! - `scan`: the pure scan-limit decision.
//! - `lookup`: orchestrates store and decision for one lookup request.
//! - `minting`: allocates new identifiers and appends their records.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod scan;
pub mod lookup;
pub mod minting;
#[cfg(test)]
pub mod test_support;
