//! Column names of the backing table.
//!
//! Canonical names are what gets written; each field also has a list of
//! accepted names, in priority order, used when reading older files.

pub const IDENTIFIER: &str = "UUID";
pub const MANUFACTURING_DATE: &str = "ManufacturingDate";
pub const EXPIRATION_DATE: &str = "ExpirationDate";
pub const INFO: &str = "Info";
pub const SOLD_DATE: &str = "SoldDate";
pub const SCAN_COUNT: &str = "ScanCount";

/// Header row in write order.
pub const HEADER: [&str; 6] = [
    IDENTIFIER,
    MANUFACTURING_DATE,
    EXPIRATION_DATE,
    INFO,
    SOLD_DATE,
    SCAN_COUNT,
];

pub const IDENTIFIER_SYNONYMS: &[&str] = &[IDENTIFIER, "identifier", "Identifier"];
pub const MANUFACTURING_DATE_SYNONYMS: &[&str] =
    &[MANUFACTURING_DATE, "manufacturingDate", "CreatedDate", "Timestamp"];
pub const EXPIRATION_DATE_SYNONYMS: &[&str] = &[EXPIRATION_DATE, "expirationDate", "ExpiryDate"];
pub const INFO_SYNONYMS: &[&str] = &[INFO, "info"];
pub const SOLD_DATE_SYNONYMS: &[&str] = &[SOLD_DATE, "soldDate"];
pub const SCAN_COUNT_SYNONYMS: &[&str] = &[SCAN_COUNT, "scanCount"];

/// First non-blank value among `names`, trimmed.
pub fn first_present<'a, F>(names: &[&str], field: F) -> Option<&'a str>
where
    F: Fn(&str) -> Option<&'a str>,
{
    names
        .iter()
        .filter_map(|&name| field(name))
        .map(str::trim)
        .find(|v| !v.is_empty())
}
