//! Sync session state machine.
//!
//! The session is an explicit finite state machine (logged out → syncing →
//! dashboard) rather than a bag of optional fields, so an impossible
//! combination like "loading with a populated balance" cannot be
//! represented. A successful sync installs balance, transaction list, stats
//! and diagnostic log in one state transition; a failed sync leaves nothing
//! behind.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{error, info};
use thiserror::Error;

use shared::{DashboardView, SessionSnapshot, WalletSyncRequest, WalletSyncResponse};

use crate::backend::domain::stats_service::StatsService;
use crate::backend::domain::transaction_service::TransactionService;
use crate::backend::io::sync_backend::WalletSyncBackend;

/// How long one backend call may take before the session gives up. The sync
/// service rescans the chain on every request, so the ceiling is generous.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(600);

/// Everything that can go wrong with one sync attempt. Backend failures and
/// undecodable payloads are kept distinct for diagnosability even though the
/// user-visible treatment is the same.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Please enter a viewing key")]
    EmptyViewingKey,
    #[error("Sync error: {0}")]
    Backend(#[source] anyhow::Error),
    #[error("Sync service returned a malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Sync timed out after {0:?}")]
    TimedOut(Duration),
}

/// Current state of the one-and-only sync session.
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Pre-sync login screen; nothing derived is held
    LoggedOut,
    /// A backend call is in flight; at most one exists at a time
    Syncing,
    /// A sync completed; all dashboard data was installed together
    Dashboard(DashboardView),
}

/// Owns the sync lifecycle: validates requests, enforces the single-flight
/// rule, drives the extraction pipeline, and holds the resulting dashboard
/// state together with its UI-only row-expansion marker.
#[derive(Clone)]
pub struct SyncSessionService {
    backend: Arc<dyn WalletSyncBackend>,
    transaction_service: TransactionService,
    stats_service: StatsService,
    state: Arc<Mutex<SessionState>>,
    sync_timeout: Duration,
}

impl SyncSessionService {
    pub fn new(backend: Arc<dyn WalletSyncBackend>) -> Self {
        Self::with_timeout(backend, DEFAULT_SYNC_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn WalletSyncBackend>, sync_timeout: Duration) -> Self {
        Self {
            backend,
            transaction_service: TransactionService::new(),
            stats_service: StatsService::new(),
            state: Arc::new(Mutex::new(SessionState::LoggedOut)),
            sync_timeout,
        }
    }

    /// Run one full sync cycle and install the dashboard.
    ///
    /// An empty viewing key is rejected before any state changes. A request
    /// arriving while another sync is in flight is a no-op that returns the
    /// current snapshot; the backend is never called twice concurrently. On
    /// any failure the session falls back to the logged-out state with no
    /// partial data retained.
    pub async fn sync(&self, request: WalletSyncRequest) -> Result<SessionSnapshot, SyncError> {
        if request.viewing_key.trim().is_empty() {
            return Err(SyncError::EmptyViewingKey);
        }

        {
            let mut state = self.lock_state();
            if matches!(*state, SessionState::Syncing) {
                info!("Sync already in flight, ignoring new request");
                return Ok(Self::snapshot_of(&state));
            }
            *state = SessionState::Syncing;
        }

        match self.run_sync(&request).await {
            Ok(dashboard) => {
                let mut state = self.lock_state();
                *state = SessionState::Dashboard(dashboard);
                Ok(Self::snapshot_of(&state))
            }
            Err(err) => {
                error!("Sync failed: {}", err);
                *self.lock_state() = SessionState::LoggedOut;
                Err(err)
            }
        }
    }

    /// The fallible middle of a sync: backend call under a deadline, payload
    /// decode, then the extraction pipeline. Pure with respect to session
    /// state; the caller owns the state transitions.
    async fn run_sync(&self, request: &WalletSyncRequest) -> Result<DashboardView, SyncError> {
        let payload = tokio::time::timeout(self.sync_timeout, self.backend.sync_wallet(request))
            .await
            .map_err(|_| SyncError::TimedOut(self.sync_timeout))?
            .map_err(SyncError::Backend)?;

        let response: WalletSyncResponse =
            serde_json::from_str(&payload).map_err(SyncError::MalformedResponse)?;

        let transactions = self
            .transaction_service
            .extract_transactions(&response.history_raw);
        let stats = self.stats_service.compute(&transactions);
        info!(
            "Sync complete: balance {} ZEC, {} transactions (in {}, out {})",
            response.balance_zec,
            transactions.len(),
            stats.total_in,
            stats.total_out
        );

        Ok(DashboardView {
            balance_zec: response.balance_zec,
            balance_zat: response.balance_zat,
            sync_height: response.sync_height,
            transactions,
            stats,
            debug_log: response.pretty_log,
            expanded_txid: None,
        })
    }

    /// Leave the dashboard, discarding balance, transactions and logs.
    /// Meaningless in any other state, where it logs and changes nothing.
    pub fn exit(&self) -> SessionSnapshot {
        let mut state = self.lock_state();
        match *state {
            SessionState::Dashboard(_) => {
                info!("Exiting wallet dashboard");
                *state = SessionState::LoggedOut;
            }
            _ => info!("Exit requested outside the dashboard, ignoring"),
        }
        Self::snapshot_of(&state)
    }

    /// Flip the expanded/collapsed marker for one transaction row. UI-only:
    /// never touches transaction content, valid at any time on the
    /// dashboard, a no-op elsewhere.
    pub fn toggle_details(&self, txid: &str) -> SessionSnapshot {
        let mut state = self.lock_state();
        if let SessionState::Dashboard(dashboard) = &mut *state {
            if dashboard.expanded_txid.as_deref() == Some(txid) {
                dashboard.expanded_txid = None;
            } else {
                dashboard.expanded_txid = Some(txid.to_string());
            }
        }
        Self::snapshot_of(&state)
    }

    /// Current session state as the webview sees it.
    pub fn snapshot(&self) -> SessionSnapshot {
        Self::snapshot_of(&self.lock_state())
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    fn snapshot_of(state: &SessionState) -> SessionSnapshot {
        match state {
            SessionState::LoggedOut => SessionSnapshot {
                is_syncing: false,
                dashboard: None,
            },
            SessionState::Syncing => SessionSnapshot {
                is_syncing: true,
                dashboard: None,
            },
            SessionState::Dashboard(dashboard) => SessionSnapshot {
                is_syncing: false,
                dashboard: Some(dashboard.clone()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Canned backend: pops one prepared response per call, optionally
    /// holding each call open until the test releases it.
    struct MockBackend {
        responses: Mutex<VecDeque<Result<String, String>>>,
        gate: Option<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl MockBackend {
        fn with_payloads(responses: Vec<Result<String, String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                gate: None,
                calls: AtomicUsize::new(0),
            })
        }

        fn once(response: Result<String, String>) -> Arc<Self> {
            Self::with_payloads(vec![response])
        }

        fn gated(response: Result<String, String>, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(vec![response].into()),
                gate: Some(gate),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WalletSyncBackend for MockBackend {
        async fn sync_wallet(&self, _request: &WalletSyncRequest) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no canned response left".to_string()));
            response.map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn payload(balance_zec: f64, history_raw: &str) -> String {
        serde_json::to_string(&WalletSyncResponse {
            balance_zat: (balance_zec * 100_000_000.0) as u64,
            balance_zec,
            sync_height: "height 3700123".to_string(),
            history_raw: history_raw.to_string(),
            pretty_log: "debug output".to_string(),
        })
        .unwrap()
    }

    fn request(viewing_key: &str) -> WalletSyncRequest {
        WalletSyncRequest {
            viewing_key: viewing_key.to_string(),
            is_testnet: true,
            birthday: 3_700_000,
        }
    }

    const RECEIVE_ENTRY: &str = "TransactionSummary { txid: TxId(\"aa11\"), \
        status: Confirmed(3700123), kind: Received, value: 500000000, \
        fee: None, memo: Some(\"coffee\") }";

    #[tokio::test]
    async fn empty_viewing_key_is_rejected_without_touching_the_backend() {
        let backend = MockBackend::once(Ok(payload(1.0, "")));
        let service = SyncSessionService::new(backend.clone());

        let err = service.sync(request("   ")).await.unwrap_err();
        assert!(matches!(err, SyncError::EmptyViewingKey));
        assert_eq!(backend.call_count(), 0);

        let snapshot = service.snapshot();
        assert!(!snapshot.is_syncing);
        assert!(snapshot.dashboard.is_none());
    }

    #[tokio::test]
    async fn successful_sync_installs_balance_and_transactions_together() {
        let backend = MockBackend::once(Ok(payload(5.0, RECEIVE_ENTRY)));
        let service = SyncSessionService::new(backend);

        let snapshot = service.sync(request("uviewtest1...")).await.unwrap();
        assert!(!snapshot.is_syncing);
        let dashboard = snapshot.dashboard.expect("dashboard after success");
        assert_eq!(dashboard.balance_zec, 5.0);
        assert_eq!(dashboard.transactions.len(), 1);
        assert_eq!(dashboard.transactions[0].memo, "coffee");
        assert_eq!(dashboard.stats.total_in, 5.0);
        assert_eq!(dashboard.stats.total_out, 0.0);
        assert_eq!(dashboard.debug_log, "debug output");
        assert_eq!(dashboard.expanded_txid, None);
    }

    #[tokio::test]
    async fn backend_failure_returns_to_logged_out_with_nothing_retained() {
        let backend = MockBackend::once(Err("connection refused".to_string()));
        let service = SyncSessionService::new(backend);

        let err = service.sync(request("uviewtest1...")).await.unwrap_err();
        assert!(matches!(err, SyncError::Backend(_)));

        let snapshot = service.snapshot();
        assert!(!snapshot.is_syncing);
        assert!(snapshot.dashboard.is_none());
    }

    #[tokio::test]
    async fn malformed_payload_is_a_distinct_error_kind() {
        let backend = MockBackend::once(Ok("this is not json".to_string()));
        let service = SyncSessionService::new(backend);

        let err = service.sync(request("uviewtest1...")).await.unwrap_err();
        assert!(matches!(err, SyncError::MalformedResponse(_)));
        assert!(service.snapshot().dashboard.is_none());
    }

    #[tokio::test]
    async fn missing_payload_field_is_malformed_not_a_backend_error() {
        let backend = MockBackend::once(Ok(r#"{"balance_zec": 1.0}"#.to_string()));
        let service = SyncSessionService::new(backend);

        let err = service.sync(request("uviewtest1...")).await.unwrap_err();
        assert!(matches!(err, SyncError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn second_sync_while_in_flight_is_a_no_op() {
        let gate = Arc::new(Notify::new());
        let backend = MockBackend::gated(Ok(payload(1.0, "")), gate.clone());
        let service = SyncSessionService::new(backend.clone());

        let first = {
            let service = service.clone();
            tokio::spawn(async move { service.sync(request("uviewtest1...")).await })
        };

        // Wait for the first sync to reach the backend call.
        for _ in 0..200 {
            if service.snapshot().is_syncing {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert!(service.snapshot().is_syncing);

        let snapshot = service.sync(request("uviewtest1...")).await.unwrap();
        assert!(snapshot.is_syncing);
        assert_eq!(backend.call_count(), 1);

        gate.notify_one();
        let snapshot = first.await.unwrap().unwrap();
        assert!(snapshot.dashboard.is_some());
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn hung_backend_call_times_out_and_resets_the_session() {
        let gate = Arc::new(Notify::new());
        let backend = MockBackend::gated(Ok(payload(1.0, "")), gate);
        let service =
            SyncSessionService::with_timeout(backend, Duration::from_millis(50));

        let err = service.sync(request("uviewtest1...")).await.unwrap_err();
        assert!(matches!(err, SyncError::TimedOut(_)));

        let snapshot = service.snapshot();
        assert!(!snapshot.is_syncing);
        assert!(snapshot.dashboard.is_none());
    }

    #[tokio::test]
    async fn exit_discards_the_dashboard() {
        let backend = MockBackend::once(Ok(payload(2.0, RECEIVE_ENTRY)));
        let service = SyncSessionService::new(backend);

        service.sync(request("uviewtest1...")).await.unwrap();
        assert!(service.snapshot().dashboard.is_some());

        let snapshot = service.exit();
        assert!(!snapshot.is_syncing);
        assert!(snapshot.dashboard.is_none());
    }

    #[tokio::test]
    async fn toggle_details_expands_and_collapses_without_touching_content() {
        let backend = MockBackend::once(Ok(payload(5.0, RECEIVE_ENTRY)));
        let service = SyncSessionService::new(backend);
        service.sync(request("uviewtest1...")).await.unwrap();

        let before = service.snapshot().dashboard.unwrap().transactions;

        let snapshot = service.toggle_details("aa11");
        let dashboard = snapshot.dashboard.unwrap();
        assert_eq!(dashboard.expanded_txid.as_deref(), Some("aa11"));
        assert_eq!(dashboard.transactions, before);

        let snapshot = service.toggle_details("aa11");
        assert_eq!(snapshot.dashboard.unwrap().expanded_txid, None);

        let snapshot = service.toggle_details("other");
        assert_eq!(
            snapshot.dashboard.unwrap().expanded_txid.as_deref(),
            Some("other")
        );
    }

    #[tokio::test]
    async fn toggle_details_outside_the_dashboard_is_a_no_op() {
        let backend = MockBackend::with_payloads(vec![]);
        let service = SyncSessionService::new(backend);

        let snapshot = service.toggle_details("aa11");
        assert!(!snapshot.is_syncing);
        assert!(snapshot.dashboard.is_none());
    }

    #[tokio::test]
    async fn each_sync_replaces_the_previous_dashboard_wholesale() {
        let backend = MockBackend::with_payloads(vec![
            Ok(payload(5.0, RECEIVE_ENTRY)),
            Ok(payload(0.5, "")),
        ]);
        let service = SyncSessionService::new(backend);

        service.sync(request("uviewtest1...")).await.unwrap();
        let snapshot = service.sync(request("uviewtest1...")).await.unwrap();

        let dashboard = snapshot.dashboard.unwrap();
        assert_eq!(dashboard.balance_zec, 0.5);
        assert!(dashboard.transactions.is_empty());
        assert_eq!(dashboard.stats.total_in, 0.0);
    }
}
