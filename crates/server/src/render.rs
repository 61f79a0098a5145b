//! HTML pages for lookup results.
//!
//! Markup is presentation only; what matters to clients is the verdict badge
//! (`data-verdict`) and which item fields each verdict shows.

use std::fmt::Write;

use models::ItemRecord;
use service::lookup::LookupOutcome;
use service::scan::Verdict;

const STYLE: &str = "\
body{font-family:Arial,sans-serif;margin:40px;}\
h1{margin-bottom:16px;}\
p{margin:8px 0;}\
.verdict{display:inline-block;margin:0 0 18px 0;padding:6px 10px;border-radius:6px;\
color:#fff;font-weight:700;letter-spacing:0.5px;}\
.verified{background:#1f7a1f;}\
.unverified{background:#a81f1f;}\
.limit{background:#b86800;}\
.warning{color:#b86800;font-style:italic;}";

/// Escape text for use in element content and single-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(body: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset='utf-8'>\
         <title>Code Lookup</title><style>{STYLE}</style></head><body>{body}</body></html>"
    )
}

fn badge(verdict: Verdict, class: &str, label: &str) -> String {
    format!("<div class='verdict {class}' data-verdict='{verdict}'>{label}</div>")
}

fn field(out: &mut String, label: &str, value: &str) {
    let _ = write!(out, "<p><strong>{label}:</strong> {}</p>", escape(value));
}

pub fn landing_page() -> String {
    page("<h1>Code Lookup</h1><p>Scan a QR code or visit /&lt;UUID&gt;.</p>")
}

pub fn failure_page() -> String {
    page("<h1>Code Lookup</h1><p>The lookup could not be completed. Please try again.</p>")
}

fn unverified_page() -> String {
    page(&badge(Verdict::Unverified, "unverified", "UNVERIFIED"))
}

fn limit_reached_page(record: &ItemRecord, max_scans: u32) -> String {
    let mut body = badge(Verdict::LimitReached, "limit", "SCAN LIMIT REACHED");
    body.push_str("<h1>Item Details</h1>");
    field(&mut body, "UUID", record.identifier());
    field(&mut body, "Scans", &format!("{}/{max_scans} (Maximum reached)", record.scan_count()));
    body.push_str("<p class='warning'>This QR code has reached its maximum scan limit.</p>");
    page(&body)
}

fn verified_page(record: &ItemRecord, max_scans: u32) -> String {
    let mut body = badge(Verdict::Verified, "verified", "VERIFIED");
    body.push_str("<h1>Item Details</h1>");
    field(&mut body, "UUID", record.identifier());
    field(&mut body, "Manufacturing Date", record.manufacturing_date());
    field(&mut body, "Expiration Date", record.expiration_date());
    field(&mut body, "Sold Date", record.sold_date().unwrap_or("Not yet sold"));
    field(&mut body, "Info", record.info());
    field(&mut body, "Scans", &format!("{}/{max_scans}", record.scan_count()));
    page(&body)
}

pub fn outcome_page(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Landing => landing_page(),
        LookupOutcome::Unverified { .. } => unverified_page(),
        LookupOutcome::LimitReached { record, max_scans } => limit_reached_page(record, *max_scans),
        LookupOutcome::Verified { record, max_scans } => verified_page(record, *max_scans),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(scans: u32) -> ItemRecord {
        let mut rec = ItemRecord::new("ABC123", "2024-01-01", "2027-01-01", "<b>TANGO</b>").unwrap();
        for _ in 0..scans {
            rec.record_scan();
        }
        rec
    }

    #[test]
    fn verified_page_lists_every_field() {
        let html = outcome_page(&LookupOutcome::Verified { record: record(2), max_scans: 5 });
        assert!(html.contains("data-verdict='VERIFIED'"));
        assert!(html.contains("<strong>UUID:</strong> ABC123"));
        assert!(html.contains("<strong>Manufacturing Date:</strong> 2024-01-01"));
        assert!(html.contains("<strong>Expiration Date:</strong> 2027-01-01"));
        assert!(html.contains("<strong>Sold Date:</strong> Not yet sold"));
        assert!(html.contains("<strong>Scans:</strong> 2/5"));
        // info is escaped
        assert!(html.contains("&lt;b&gt;TANGO&lt;/b&gt;"));
        assert!(!html.contains("<b>TANGO"));
    }

    #[test]
    fn limit_page_shows_only_identifier_and_totals() {
        let html = outcome_page(&LookupOutcome::LimitReached { record: record(5), max_scans: 5 });
        assert!(html.contains("data-verdict='LIMIT_REACHED'"));
        assert!(html.contains("SCAN LIMIT REACHED"));
        assert!(html.contains("5/5 (Maximum reached)"));
        assert!(!html.contains("Manufacturing Date"));
    }

    #[test]
    fn unverified_page_has_no_item_fields() {
        let html = outcome_page(&LookupOutcome::Unverified { identifier: "<x>".into() });
        assert!(html.contains("data-verdict='UNVERIFIED'"));
        assert!(!html.contains("Item Details"));
        assert!(!html.contains("<x>"));
    }

    #[test]
    fn escape_covers_quotes() {
        assert_eq!(escape("a'b\"c&"), "a&#39;b&quot;c&amp;");
    }
}
