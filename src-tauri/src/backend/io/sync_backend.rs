//! The single boundary to the external wallet-sync service.
//!
//! Everything the dashboard shows comes back from one request/response
//! exchange: the service scans the chain for the supplied viewing key and
//! returns a balance plus its diagnostic output. The trait exists so the
//! session controller can be exercised against a canned backend in tests.

use async_trait::async_trait;
use log::info;
use shared::WalletSyncRequest;

/// One-shot sync boundary. Returns the encoded response payload; decoding is
/// the caller's responsibility so that transport failures and malformed
/// payloads stay distinguishable.
#[async_trait]
pub trait WalletSyncBackend: Send + Sync {
    async fn sync_wallet(&self, request: &WalletSyncRequest) -> anyhow::Result<String>;
}

/// Production backend: POSTs the sync request to the local sync sidecar.
pub struct HttpSyncBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSyncBackend {
    const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8237";

    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create a backend with a custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url,
        }
    }
}

impl Default for HttpSyncBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletSyncBackend for HttpSyncBackend {
    async fn sync_wallet(&self, request: &WalletSyncRequest) -> anyhow::Result<String> {
        let url = format!("{}/sync", self.base_url);
        info!(
            "Requesting wallet sync from {} (testnet: {}, birthday: {})",
            url, request.is_testnet, request.birthday
        );

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
