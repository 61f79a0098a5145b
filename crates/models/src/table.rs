use std::collections::HashMap;

use crate::record::ItemRecord;

/// Identifier-keyed records that remember the order rows were first seen in.
///
/// Keys are unique by construction: inserting an identifier that is already
/// present replaces the record in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordTable {
    order: Vec<String>,
    records: HashMap<String, ItemRecord>,
}

impl RecordTable {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    pub fn get(&self, identifier: &str) -> Option<&ItemRecord> {
        self.records.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    /// Insert or replace; returns the record previously stored under the same identifier.
    pub fn upsert(&mut self, record: ItemRecord) -> Option<ItemRecord> {
        let key = record.identifier().to_string();
        let previous = self.records.insert(key.clone(), record);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    /// Count a scan against `identifier`; `None` when it is unknown.
    pub fn record_scan(&mut self, identifier: &str) -> Option<u32> {
        self.records.get_mut(identifier).map(ItemRecord::record_scan)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

impl FromIterator<ItemRecord> for RecordTable {
    fn from_iter<I: IntoIterator<Item = ItemRecord>>(iter: I) -> Self {
        let mut table = RecordTable::new();
        for rec in iter {
            table.upsert(rec);
        }
        table
    }
}
