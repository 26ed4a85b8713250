//! Session configuration.
//!
//! Endpoints for chain data, broadcast and explorer links. Values come from
//! [`WalletConfig::default`] or from `WEBBTC_*` environment variables.

use std::time::Duration;

use chain_btc::explorer::DEFAULT_EXPLORER_URL;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

pub const DEFAULT_MEMPOOL_URL: &str = "https://mempool.space";
pub const DEFAULT_BROADCAST_URL: &str = "https://blockstream.info";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Esplora-compatible host serving UTXOs, history and fee estimates.
    pub mempool_url: String,
    /// Esplora-compatible host that accepts `POST /api/tx`.
    pub broadcast_url: String,
    /// Host used for transaction and address links.
    pub explorer_url: String,
    pub http_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            mempool_url: DEFAULT_MEMPOOL_URL.to_string(),
            broadcast_url: DEFAULT_BROADCAST_URL.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl WalletConfig {
    /// Defaults overridden by `WEBBTC_MEMPOOL_URL`, `WEBBTC_BROADCAST_URL`,
    /// `WEBBTC_EXPLORER_URL` and `WEBBTC_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, WalletError> {
        let mut config = Self::default();
        if let Some(url) = lookup("WEBBTC_MEMPOOL_URL") {
            config.mempool_url = url;
        }
        if let Some(url) = lookup("WEBBTC_BROADCAST_URL") {
            config.broadcast_url = url;
        }
        if let Some(url) = lookup("WEBBTC_EXPLORER_URL") {
            config.explorer_url = url;
        }
        if let Some(secs) = lookup("WEBBTC_HTTP_TIMEOUT_SECS") {
            config.http_timeout_secs = secs.parse().map_err(|_| {
                WalletError::Config(format!("WEBBTC_HTTP_TIMEOUT_SECS is not a number: {secs}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        for (name, url) in [
            ("mempool_url", &self.mempool_url),
            ("broadcast_url", &self.broadcast_url),
            ("explorer_url", &self.explorer_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(WalletError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.http_timeout_secs == 0 {
            return Err(WalletError::Config("http_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
