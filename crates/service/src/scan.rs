//! Scan-limit decision for a single lookup. No I/O.

use std::fmt;

use models::ItemRecord;

/// Outcome of one lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No record exists for the identifier.
    Unverified,
    /// The record exists but has used up its scans.
    LimitReached,
    /// The record exists and this scan is counted.
    Verified,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Unverified => "UNVERIFIED",
            Verdict::LimitReached => "LIMIT_REACHED",
            Verdict::Verified => "VERIFIED",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanDecision {
    pub verdict: Verdict,
    /// Whether the record's counter must go up by one.
    pub increment: bool,
}

/// Scan ceiling applied to every identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    max_scans: u32,
}

impl ScanPolicy {
    pub fn new(max_scans: u32) -> Self {
        Self { max_scans }
    }

    pub fn max_scans(&self) -> u32 {
        self.max_scans
    }

    /// Decide from the current scan count, `None` meaning no record.
    ///
    /// A counter equal to the ceiling is already exhausted, so an identifier
    /// gets at most `max_scans` verified lookups in its lifetime.
    pub fn decide(&self, scan_count: Option<u32>) -> ScanDecision {
        match scan_count {
            None => ScanDecision { verdict: Verdict::Unverified, increment: false },
            Some(n) if n >= self.max_scans => ScanDecision { verdict: Verdict::LimitReached, increment: false },
            Some(_) => ScanDecision { verdict: Verdict::Verified, increment: true },
        }
    }

    pub fn authorize(&self, record: Option<&ItemRecord>) -> ScanDecision {
        self.decide(record.map(ItemRecord::scan_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_record_is_unverified() {
        let d = ScanPolicy::new(5).authorize(None);
        assert_eq!(d, ScanDecision { verdict: Verdict::Unverified, increment: false });
    }

    #[test]
    fn below_ceiling_verifies_and_increments() {
        let policy = ScanPolicy::new(5);
        for n in 0..5 {
            assert_eq!(policy.decide(Some(n)), ScanDecision { verdict: Verdict::Verified, increment: true });
        }
    }

    #[test]
    fn at_or_above_ceiling_is_frozen() {
        let policy = ScanPolicy::new(5);
        for n in [5, 6, 100, u32::MAX] {
            assert_eq!(policy.decide(Some(n)), ScanDecision { verdict: Verdict::LimitReached, increment: false });
        }
    }

    #[test]
    fn authorize_reads_the_record_counter() {
        let mut rec = ItemRecord::new("AAA", "", "", "").unwrap();
        let policy = ScanPolicy::new(1);
        assert_eq!(policy.authorize(Some(&rec)).verdict, Verdict::Verified);
        rec.record_scan();
        assert_eq!(policy.authorize(Some(&rec)).verdict, Verdict::LimitReached);
    }

    #[test]
    fn verdict_vocabulary() {
        assert_eq!(Verdict::Unverified.to_string(), "UNVERIFIED");
        assert_eq!(Verdict::LimitReached.to_string(), "LIMIT_REACHED");
        assert_eq!(Verdict::Verified.to_string(), "VERIFIED");
    }
}
