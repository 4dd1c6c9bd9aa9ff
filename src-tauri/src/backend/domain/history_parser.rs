//! Raw transaction extraction from the sync service's diagnostic log.
//!
//! The sync service reports wallet history as a debug-formatted text blob
//! rather than a structured payload, so transaction entries are recovered by
//! pattern matching. This module is the only place that knows about the blob
//! format; everything downstream works with the typed entry records it emits.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Field prefix that opens every transaction entry in the blob. Used to bound
/// the recipient search window to a single entry.
const TXID_MARKER: &str = "txid: TxId(\"";

static RECEIVED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)txid: TxId\("([^"]+)"\).*?kind: Received, value: ([^,\s}]+).*?memo: (None|Some\("(.*?)"\))"#,
    )
    .expect("received pattern is valid")
});

static SENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)txid: TxId\("([^"]+)"\).*?kind: Sent\(Send\), value: ([^,\s}]+)"#)
        .expect("sent pattern is valid")
});

static RECIPIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"recipient: "([^"]*)""#).expect("recipient pattern is valid")
});

/// A matched inbound entry, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReceivedEntry {
    pub txid: String,
    /// Amount in zatoshis
    pub value_zat: u64,
    /// `None` covers both an absent memo field and an empty memo payload
    pub memo: Option<String>,
}

/// A matched outbound entry, before normalization. The recipient is resolved
/// separately because the blob places it inconsistently relative to the
/// matched fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentEntry {
    pub txid: String,
    /// Amount in zatoshis
    pub value_zat: u64,
}

/// Scan the full blob for inbound entries, in first-occurrence order.
///
/// An entry whose value field does not parse as an integer is logged and
/// skipped; one bad entry must not abort the rest of the scan.
pub fn scan_received(raw: &str) -> Vec<RawReceivedEntry> {
    let mut entries = Vec::new();
    for caps in RECEIVED_RE.captures_iter(raw) {
        let txid = caps[1].to_string();
        let value_zat = match caps[2].parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "Skipping received entry {}: unparseable value field {:?}",
                    txid, &caps[2]
                );
                continue;
            }
        };
        // An explicitly empty memo payload counts as no memo.
        let memo = caps
            .get(4)
            .map(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        entries.push(RawReceivedEntry {
            txid,
            value_zat,
            memo,
        });
    }
    entries
}

/// Scan the full blob for outbound entries, in first-occurrence order.
pub fn scan_sent(raw: &str) -> Vec<RawSentEntry> {
    let mut entries = Vec::new();
    for caps in SENT_RE.captures_iter(raw) {
        let txid = caps[1].to_string();
        let value_zat = match caps[2].parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "Skipping sent entry {}: unparseable value field {:?}",
                    txid, &caps[2]
                );
                continue;
            }
        };
        entries.push(RawSentEntry { txid, value_zat });
    }
    entries
}

/// Find the recipient address for an outbound entry.
///
/// The search is scoped to the entry's own block: it starts at the first
/// occurrence of the txid and stops at the next txid field, so a recipient
/// belonging to a later transaction can never leak backwards.
pub fn resolve_recipient(raw: &str, txid: &str) -> Option<String> {
    if raw.matches(txid).count() > 1 {
        // The sync service is assumed to emit unique identifiers, but that is
        // not verified anywhere. Recipient attribution is unreliable here.
        warn!("txid {} occurs more than once in the diagnostic log", txid);
    }

    let start = raw.find(txid)?;
    let tail = &raw[start..];
    let block_end = tail[txid.len()..]
        .find(TXID_MARKER)
        .map(|offset| txid.len() + offset)
        .unwrap_or(tail.len());

    RECIPIENT_RE
        .captures(&tail[..block_end])
        .map(|caps| caps[1].to_string())
}
