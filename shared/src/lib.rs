use serde::{Deserialize, Serialize};

/// Number of zatoshis (base units) in one whole ZEC.
pub const ZATS_PER_ZEC: u64 = 100_000_000;

/// Direction of a wallet transaction, as surfaced to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Funds received into the wallet
    Received,
    /// Funds sent out of the wallet
    Sent,
}

/// One normalized wallet transaction extracted from the sync diagnostic log.
///
/// Immutable once constructed; the whole list is replaced on every sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub kind: TransactionKind,
    /// Amount in whole ZEC, converted from zatoshis (no rounding applied)
    pub amount: f64,
    /// Memo text for received transactions ("No Memo" when absent),
    /// fixed "Outgoing" for sent transactions
    pub memo: String,
    /// Opaque transaction identifier; used as the row key in the UI
    pub txid: String,
    /// Destination address for sent transactions, when discoverable
    pub recipient: Option<String>,
    /// Settlement label; the diagnostic log only ever describes settled
    /// entries, so this is always "Confirmed"
    pub status: String,
}

/// Inflow/outflow totals derived from a transaction list.
///
/// Always recomputed from the current list, never cached independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Sum of amounts over all received transactions (ZEC)
    pub total_in: f64,
    /// Sum of amounts over all sent transactions (ZEC)
    pub total_out: f64,
}

/// Request forwarded to the external wallet-sync service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSyncRequest {
    /// Unified viewing key granting read-only access to the wallet
    pub viewing_key: String,
    pub is_testnet: bool,
    /// Block height the scan starts from
    pub birthday: u32,
}

/// Decoded response payload from the wallet-sync service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletSyncResponse {
    /// Total shielded balance in zatoshis
    pub balance_zat: u64,
    /// Total shielded balance in whole ZEC (the authoritative display value)
    pub balance_zec: f64,
    /// Server/sync-height info string, surfaced verbatim
    pub sync_height: String,
    /// Raw transaction-summary debug output consumed by the history parser
    pub history_raw: String,
    /// Human-oriented diagnostic log shown in the developer panel
    pub pretty_log: String,
}

/// Dashboard data installed atomically by a successful sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub balance_zec: f64,
    pub balance_zat: u64,
    pub sync_height: String,
    pub transactions: Vec<Transaction>,
    pub stats: AggregateStats,
    /// Developer log from the sync service, shown behind a disclosure toggle
    pub debug_log: String,
    /// Which transaction row is expanded, if any (UI-only state)
    pub expanded_txid: Option<String>,
}

/// Snapshot of the sync session handed to the webview after every command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// True while a sync is in flight
    pub is_syncing: bool,
    /// Present only while the session is on the dashboard
    pub dashboard: Option<DashboardView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::Received).unwrap(),
            "\"received\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionKind::Sent).unwrap(),
            "\"sent\""
        );
    }

    #[test]
    fn wallet_sync_response_decodes_from_payload_json() {
        let payload = r#"{
            "balance_zat": 150000000,
            "balance_zec": 1.5,
            "sync_height": "height 3700123",
            "history_raw": "[]",
            "pretty_log": "ok"
        }"#;
        let response: WalletSyncResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(response.balance_zat, 150_000_000);
        assert_eq!(response.balance_zec, 1.5);
    }

    #[test]
    fn wallet_sync_response_rejects_non_numeric_balance() {
        let payload = r#"{
            "balance_zat": "lots",
            "balance_zec": 1.5,
            "sync_height": "",
            "history_raw": "",
            "pretty_log": ""
        }"#;
        assert!(serde_json::from_str::<WalletSyncResponse>(payload).is_err());
    }
}
