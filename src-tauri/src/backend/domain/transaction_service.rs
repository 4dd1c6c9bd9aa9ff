//! Normalization of raw history matches into the canonical transaction model.
//!
//! This service is the narrow facade over the fragile text extraction: the
//! rest of the system only ever calls `extract_transactions(raw)` and gets an
//! ordered `Vec<Transaction>` back, so the parser can be replaced wholesale
//! if the sync service ever grows a structured history payload.

use log::info;
use shared::{Transaction, TransactionKind, ZATS_PER_ZEC};

use crate::backend::domain::history_parser::{
    self, RawReceivedEntry, RawSentEntry,
};

/// Memo shown for a received transaction that carried none.
pub const NO_MEMO: &str = "No Memo";
/// Memo fixed for every outbound transaction.
pub const OUTGOING_MEMO: &str = "Outgoing";
/// Recipient shown when none is discoverable in the diagnostic log.
pub const UNKNOWN_RECIPIENT: &str = "Unknown Recipient";
/// The diagnostic log only describes settled entries.
pub const CONFIRMED_STATUS: &str = "Confirmed";

/// Service that turns the raw diagnostic log into normalized transactions.
#[derive(Clone)]
pub struct TransactionService;

impl TransactionService {
    pub fn new() -> Self {
        Self
    }

    /// Extract every transaction from the raw diagnostic log.
    ///
    /// Received and sent entries are scanned independently, normalized, and
    /// concatenated received-first; the combined list is then reversed so the
    /// most recently matched entries of either kind surface first. That is a
    /// presentation convention, not a chronological guarantee; the log
    /// carries no usable timestamps.
    pub fn extract_transactions(&self, history_raw: &str) -> Vec<Transaction> {
        let received = history_parser::scan_received(history_raw);
        let sent = history_parser::scan_sent(history_raw);
        info!(
            "Extracted {} received and {} sent entries from diagnostic log",
            received.len(),
            sent.len()
        );
        self.normalize(history_raw, received, sent)
    }

    /// Turn the two raw match sequences into one ordered transaction list.
    ///
    /// The raw log is still needed here because recipient resolution for
    /// outbound entries re-reads the entry's block.
    pub fn normalize(
        &self,
        history_raw: &str,
        received: Vec<RawReceivedEntry>,
        sent: Vec<RawSentEntry>,
    ) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = received
            .into_iter()
            .map(Self::normalize_received)
            .collect();
        transactions.extend(
            sent.into_iter()
                .map(|entry| Self::normalize_sent(history_raw, entry)),
        );
        transactions.reverse();
        transactions
    }

    fn normalize_received(entry: RawReceivedEntry) -> Transaction {
        Transaction {
            kind: TransactionKind::Received,
            amount: zats_to_zec(entry.value_zat),
            memo: entry.memo.unwrap_or_else(|| NO_MEMO.to_string()),
            txid: entry.txid,
            recipient: None,
            status: CONFIRMED_STATUS.to_string(),
        }
    }

    fn normalize_sent(history_raw: &str, entry: RawSentEntry) -> Transaction {
        let recipient = history_parser::resolve_recipient(history_raw, &entry.txid)
            .unwrap_or_else(|| UNKNOWN_RECIPIENT.to_string());
        Transaction {
            kind: TransactionKind::Sent,
            amount: zats_to_zec(entry.value_zat),
            memo: OUTGOING_MEMO.to_string(),
            txid: entry.txid,
            recipient: Some(recipient),
            status: CONFIRMED_STATUS.to_string(),
        }
    }
}

impl Default for TransactionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a zatoshi amount to whole ZEC. Full precision; rounding is the
/// presentation layer's concern.
fn zats_to_zec(zats: u64) -> f64 {
    zats as f64 / ZATS_PER_ZEC as f64
}
