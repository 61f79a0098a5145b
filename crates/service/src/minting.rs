//! Identifier allocation for newly manufactured items.
//!
//! Each minted record gets a random identifier that is unique within the
//! store, today's date as its manufacturing date and an expiration date a
//! fixed number of years later.

use chrono::{Datelike, NaiveDate};
use models::{ItemRecord, RecordTable};
use rand::Rng;
use tracing::info;

use crate::errors::ServiceError;
use crate::storage::RecordStore;

pub const CODE_LENGTH: usize = 24;
pub const VALIDITY_YEARS: i32 = 3;

const ALPHANUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const INFO_WORDS: [&str; 25] = [
    "ALPHA", "BRAVO", "CHARLIE", "DELTA", "ECHO", "FOXTROT", "GOLF", "HOTEL", "JULIET", "KILO",
    "LIMA", "MIKE", "NOVEMBER", "OSCAR", "PAPA", "QUEBEC", "ROMEO", "SIERRA", "TANGO", "UNIFORM",
    "VICTOR", "WHISKEY", "XRAY", "YANKEE", "ZULU",
];

pub fn generate_identifier<R: Rng>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(ALPHANUM[rng.gen_range(0..ALPHANUM.len())]))
        .collect()
}

/// Descriptive label such as `KILO-ECHO-042`.
pub fn generate_info<R: Rng>(rng: &mut R) -> String {
    let first = INFO_WORDS[rng.gen_range(0..INFO_WORDS.len())];
    let second = INFO_WORDS[rng.gen_range(0..INFO_WORDS.len())];
    let number: u16 = rng.gen_range(0..1000);
    format!("{first}-{second}-{number:03}")
}

/// Same day and month `years` later; Feb 29 lands on Feb 28 when the target
/// year is not a leap year. `None` only if the year leaves chrono's range.
pub fn add_years(date: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = date.year().checked_add(years)?;
    date.with_year(year).or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
}

pub fn expiration_for(manufactured: NaiveDate) -> Option<NaiveDate> {
    add_years(manufactured, VALIDITY_YEARS)
}

/// URL a scanner should open for `identifier`.
pub fn lookup_url(base_url: &str, identifier: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), identifier)
}

/// Build a record for `identifier` manufactured on `manufactured`.
pub fn new_record(identifier: String, manufactured: NaiveDate, info: String) -> Result<ItemRecord, ServiceError> {
    let expires = expiration_for(manufactured)
        .ok_or_else(|| ServiceError::Validation(format!("no expiration date for {manufactured}")))?;
    Ok(ItemRecord::new(
        identifier,
        manufactured.format("%Y-%m-%d").to_string(),
        expires.format("%Y-%m-%d").to_string(),
        info,
    )?)
}

/// Append one fresh record to the store and return it.
///
/// Runs under the store's update guard, so the uniqueness check and the write
/// cannot interleave with lookups or other mints in this process.
pub async fn mint(store: &dyn RecordStore, manufactured: NaiveDate) -> Result<ItemRecord, ServiceError> {
    let mut minted: Option<ItemRecord> = None;
    store
        .update(Box::new(|table: &mut RecordTable| -> Result<bool, ServiceError> {
            let mut rng = rand::rngs::OsRng;
            let mut identifier = generate_identifier(&mut rng);
            while table.contains(&identifier) {
                identifier = generate_identifier(&mut rng);
            }
            let record = new_record(identifier, manufactured, generate_info(&mut rng))?;
            table.upsert(record.clone());
            minted = Some(record);
            Ok(true)
        }))
        .await?;

    let record = minted.ok_or_else(|| ServiceError::Validation("mint produced no record".into()))?;
    info!(identifier = record.identifier(), manufactured = %manufactured, "minted identifier");
    Ok(record)
}
