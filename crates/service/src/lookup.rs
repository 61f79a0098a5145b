use std::borrow::Cow;
use std::sync::Arc;

use models::{ItemRecord, RecordTable};
use tracing::{debug, info};

use crate::errors::ServiceError;
use crate::scan::{ScanPolicy, Verdict};
use crate::storage::RecordStore;

/// What a lookup request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Root or empty identifier; nothing was looked up.
    Landing,
    Unverified { identifier: String },
    LimitReached { record: ItemRecord, max_scans: u32 },
    /// `record` already carries the counted scan.
    Verified { record: ItemRecord, max_scans: u32 },
}

impl LookupOutcome {
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            LookupOutcome::Landing => None,
            LookupOutcome::Unverified { .. } => Some(Verdict::Unverified),
            LookupOutcome::LimitReached { .. } => Some(Verdict::LimitReached),
            LookupOutcome::Verified { .. } => Some(Verdict::Verified),
        }
    }
}

/// Identifier carried by a request path: everything after the leading `/`,
/// percent-decoded. `None` for the root path.
///
/// Bytes that do not decode to UTF-8 become U+FFFD; stored identifiers are
/// ASCII, so such a path can only resolve to an unknown identifier.
pub fn identifier_from_path(path: &str) -> Option<Cow<'_, str>> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    if raw.is_empty() {
        return None;
    }
    Some(match urlencoding::decode_binary(raw.as_bytes()) {
        Cow::Borrowed(_) => Cow::Borrowed(raw),
        Cow::Owned(bytes) => Cow::Owned(String::from_utf8_lossy(&bytes).into_owned()),
    })
}

/// Answers lookups against a record store under a fixed scan ceiling.
#[derive(Clone)]
pub struct LookupService {
    store: Arc<dyn RecordStore>,
    policy: ScanPolicy,
}

impl LookupService {
    pub fn new(store: Arc<dyn RecordStore>, policy: ScanPolicy) -> Self {
        Self { store, policy }
    }

    /// Resolve one lookup.
    ///
    /// The load, the decision and (for a verified scan) the save all happen
    /// inside one store update, so concurrent lookups of the same identifier
    /// each see the previous one's counter. The save completes before this
    /// returns; if it fails the caller gets the error, never a verdict.
    pub async fn lookup(&self, identifier: &str) -> Result<LookupOutcome, ServiceError> {
        if identifier.is_empty() {
            return Ok(LookupOutcome::Landing);
        }

        let policy = self.policy;
        let mut outcome: Option<LookupOutcome> = None;
        self.store
            .update(Box::new(|table: &mut RecordTable| -> Result<bool, ServiceError> {
                let decision = policy.authorize(table.get(identifier));
                let (resolved, dirty) = match decision.verdict {
                    Verdict::Unverified => {
                        (LookupOutcome::Unverified { identifier: identifier.to_string() }, false)
                    }
                    Verdict::LimitReached => {
                        let record = table.get(identifier).cloned().ok_or_else(|| missing(identifier))?;
                        (LookupOutcome::LimitReached { record, max_scans: policy.max_scans() }, false)
                    }
                    Verdict::Verified => {
                        table.record_scan(identifier);
                        let record = table.get(identifier).cloned().ok_or_else(|| missing(identifier))?;
                        (LookupOutcome::Verified { record, max_scans: policy.max_scans() }, decision.increment)
                    }
                };
                outcome = Some(resolved);
                Ok(dirty)
            }))
            .await?;

        let outcome = outcome.ok_or_else(|| missing(identifier))?;
        match &outcome {
            LookupOutcome::Verified { record, max_scans } => {
                info!(verdict = "VERIFIED", identifier, scans = record.scan_count(), max_scans = *max_scans, "lookup resolved");
            }
            LookupOutcome::LimitReached { record, max_scans } => {
                info!(verdict = "LIMIT_REACHED", identifier, scans = record.scan_count(), max_scans = *max_scans, "lookup resolved");
            }
            _ => debug!(verdict = "UNVERIFIED", identifier, "lookup resolved"),
        }
        Ok(outcome)
    }
}

fn missing(identifier: &str) -> ServiceError {
    ServiceError::Validation(format!("record {identifier} vanished during lookup"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::storage::{CsvRecordStore, Mutation};
    use crate::test_support::{cleanup, store_with};
    use async_trait::async_trait;

    const ONE_FRESH: &str = "UUID,ManufacturingDate,ExpirationDate,Info,SoldDate,ScanCount\r\n\
        FRESH0001,2024-05-01,2027-05-01,OSCAR-PAPA-314,,0\r\n";

    fn service(store: &Arc<CsvRecordStore>, max_scans: u32) -> LookupService {
        LookupService::new(store.clone(), ScanPolicy::new(max_scans))
    }

    #[test]
    fn identifiers_come_from_the_path() {
        assert_eq!(identifier_from_path("/"), None);
        assert_eq!(identifier_from_path(""), None);
        assert_eq!(identifier_from_path("/ABC123").as_deref(), Some("ABC123"));
        assert_eq!(identifier_from_path("/a/b").as_deref(), Some("a/b"));
        assert_eq!(identifier_from_path("/x%20y/z").as_deref(), Some("x y/z"));
        assert_eq!(identifier_from_path("/%41BC%31").as_deref(), Some("ABC1"));
        assert_eq!(identifier_from_path("/%FF").as_deref(), Some("\u{FFFD}"));
        // malformed escapes are kept as written
        assert_eq!(identifier_from_path("/50%").as_deref(), Some("50%"));
    }

    #[tokio::test]
    async fn five_verified_then_frozen() -> anyhow::Result<()> {
        let store = store_with("lookup_limit", ONE_FRESH).await;
        let svc = service(&store, 5);

        for expected in 1..=5 {
            match svc.lookup("FRESH0001").await? {
                LookupOutcome::Verified { record, max_scans } => {
                    assert_eq!(record.scan_count(), expected);
                    assert_eq!(max_scans, 5);
                    assert_eq!(record.info(), "OSCAR-PAPA-314");
                }
                other => panic!("scan {expected}: expected verified, got {other:?}"),
            }
            // the counter is on disk before the verdict is returned
            let on_disk = store.load_all().await?;
            assert_eq!(on_disk.get("FRESH0001").expect("record").scan_count(), expected);
        }

        for _ in 0..3 {
            match svc.lookup("FRESH0001").await? {
                LookupOutcome::LimitReached { record, max_scans } => {
                    assert_eq!(record.scan_count(), 5);
                    assert_eq!(max_scans, 5);
                }
                other => panic!("expected limit reached, got {other:?}"),
            }
        }
        assert_eq!(store.load_all().await?.get("FRESH0001").expect("record").scan_count(), 5);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn unknown_identifiers_never_touch_the_store() -> anyhow::Result<()> {
        let legacy = "UUID,CreatedDate,ScanCount\nKNOWN1,2020-01-01,1\n";
        let store = store_with("lookup_unknown", legacy).await;
        let svc = service(&store, 5);
        for id in ["NOPE", "known1", "KNOWN1 ", "a/b"] {
            assert_eq!(
                svc.lookup(id).await?,
                LookupOutcome::Unverified { identifier: id.to_string() }
            );
        }
        assert_eq!(svc.lookup("").await?, LookupOutcome::Landing);
        assert_eq!(tokio::fs::read_to_string(store.path()).await?, legacy);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_lookups_count_every_scan_once() -> anyhow::Result<()> {
        let store = store_with("lookup_race", ONE_FRESH).await;
        let svc = service(&store, 25);

        let mut tasks = Vec::new();
        for _ in 0..20 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move { svc.lookup("FRESH0001").await }));
        }
        let mut seen = Vec::new();
        for t in tasks {
            match t.await?? {
                LookupOutcome::Verified { record, .. } => seen.push(record.scan_count()),
                other => panic!("expected verified, got {other:?}"),
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=20).collect::<Vec<u32>>());
        assert_eq!(store.load_all().await?.get("FRESH0001").expect("record").scan_count(), 20);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_lookups_stop_at_the_ceiling() -> anyhow::Result<()> {
        let store = store_with("lookup_race_cap", ONE_FRESH).await;
        let svc = service(&store, 5);

        let mut tasks = Vec::new();
        for _ in 0..12 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move { svc.lookup("FRESH0001").await }));
        }
        let mut verified = 0;
        for t in tasks {
            if t.await??.verdict() == Some(Verdict::Verified) {
                verified += 1;
            }
        }
        assert_eq!(verified, 5);
        assert_eq!(store.load_all().await?.get("FRESH0001").expect("record").scan_count(), 5);
        cleanup(&store).await;
        Ok(())
    }

    /// Reads fine, refuses to write.
    struct ReadOnlyStore(RecordTable);

    #[async_trait]
    impl RecordStore for ReadOnlyStore {
        async fn ensure_initialized(&self) -> Result<(), ServiceError> { Ok(()) }
        async fn load_all(&self) -> Result<RecordTable, ServiceError> { Ok(self.0.clone()) }
        async fn save_all(&self, _: &RecordTable) -> Result<(), ServiceError> {
            Err(StoreError::Task("read-only".into()).into())
        }
        async fn update<'a>(&'a self, mutation: Mutation<'a>) -> Result<(), ServiceError> {
            let mut table = self.0.clone();
            if mutation(&mut table)? {
                self.save_all(&table).await?;
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_save_surfaces_an_error_not_a_verdict() {
        let table: RecordTable = [
            ItemRecord::new("FULL", "", "", "").unwrap(),
            ItemRecord::new("OPEN", "", "", "").unwrap(),
        ]
        .into_iter()
        .collect();
        let svc = LookupService::new(Arc::new(ReadOnlyStore(table)), ScanPolicy::new(0));
        // a zero ceiling means nothing is written, so the read-only store is fine
        assert_eq!(svc.lookup("FULL").await.unwrap().verdict(), Some(Verdict::LimitReached));

        let svc = LookupService::new(svc.store.clone(), ScanPolicy::new(3));
        assert!(matches!(svc.lookup("OPEN").await, Err(ServiceError::Store(_))));
        assert_eq!(svc.lookup("MISSING").await.unwrap().verdict(), Some(Verdict::Unverified));
    }
}
