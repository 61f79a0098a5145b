use serde::{Deserialize, Serialize};

use crate::columns::{self, first_present};
use crate::errors::ModelError;

/// One manufactured unit.
///
/// Everything except the scan counter is fixed once the record exists, so the
/// fields are only reachable through accessors and [`ItemRecord::record_scan`]
/// is the single mutator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    identifier: String,
    manufacturing_date: String,
    expiration_date: String,
    info: String,
    sold_date: Option<String>,
    scan_count: u32,
}

impl ItemRecord {
    /// A fresh, unsold, never-scanned record.
    pub fn new(
        identifier: impl Into<String>,
        manufacturing_date: impl Into<String>,
        expiration_date: impl Into<String>,
        info: impl Into<String>,
    ) -> Result<Self, ModelError> {
        let rec = Self {
            identifier: identifier.into().trim().to_string(),
            manufacturing_date: manufacturing_date.into(),
            expiration_date: expiration_date.into(),
            info: info.into(),
            sold_date: None,
            scan_count: 0,
        };
        rec.validate()?;
        Ok(rec)
    }

    /// Build a record from a persisted row, resolving every field through its
    /// accepted column names.
    ///
    /// Returns `Ok(None)` for rows without a usable identifier. Missing dates
    /// become empty strings and a missing scan count becomes 0.
    pub fn from_row<'a, F>(field: F) -> Result<Option<Self>, ModelError>
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let Some(identifier) = first_present(columns::IDENTIFIER_SYNONYMS, &field) else {
            return Ok(None);
        };
        let text = |names: &[&str]| first_present(names, &field).unwrap_or_default().to_string();

        let scan_count = match first_present(columns::SCAN_COUNT_SYNONYMS, &field) {
            None => 0,
            Some(raw) => raw.parse::<u32>().map_err(|_| ModelError::InvalidScanCount {
                identifier: identifier.to_string(),
                value: raw.to_string(),
            })?,
        };

        Ok(Some(Self {
            identifier: identifier.to_string(),
            manufacturing_date: text(columns::MANUFACTURING_DATE_SYNONYMS),
            expiration_date: text(columns::EXPIRATION_DATE_SYNONYMS),
            info: text(columns::INFO_SYNONYMS),
            sold_date: first_present(columns::SOLD_DATE_SYNONYMS, &field).map(str::to_string),
            scan_count,
        }))
    }

    /// Fields in [`columns::HEADER`] order.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.identifier.clone(),
            self.manufacturing_date.clone(),
            self.expiration_date.clone(),
            self.info.clone(),
            self.sold_date.clone().unwrap_or_default(),
            self.scan_count.to_string(),
        ]
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.identifier.is_empty() {
            return Err(ModelError::Validation("identifier must not be blank".into()));
        }
        if !self.identifier.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ModelError::Validation("identifier must be alphanumeric".into()));
        }
        let texts = [&self.manufacturing_date, &self.expiration_date, &self.info];
        if texts.iter().any(|t| !t.is_ascii()) || self.sold_date.as_deref().is_some_and(|s| !s.is_ascii()) {
            return Err(ModelError::Validation("record text must be 7-bit ASCII".into()));
        }
        Ok(())
    }

    pub fn identifier(&self) -> &str { &self.identifier }
    pub fn manufacturing_date(&self) -> &str { &self.manufacturing_date }
    pub fn expiration_date(&self) -> &str { &self.expiration_date }
    pub fn info(&self) -> &str { &self.info }
    pub fn sold_date(&self) -> Option<&str> { self.sold_date.as_deref() }
    pub fn scan_count(&self) -> u32 { self.scan_count }

    /// Count one more scan and return the new total.
    pub fn record_scan(&mut self) -> u32 {
        self.scan_count = self.scan_count.saturating_add(1);
        self.scan_count
    }
}
