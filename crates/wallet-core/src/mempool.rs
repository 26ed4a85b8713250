//! Esplora REST client for mempool.space / blockstream.info.

use async_trait::async_trait;
use chain_btc::history::HistoricalTx;
use chain_btc::network::BtcNetwork;
use chain_btc::utxo::Utxo;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::provider::{BroadcastProvider, ChainDataProvider};

/// `GET /api/v1/fees/recommended` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedFees {
    pub fastest_fee: u64,
    pub half_hour_fee: u64,
    pub hour_fee: u64,
    #[serde(default)]
    pub economy_fee: u64,
    #[serde(default)]
    pub minimum_fee: u64,
}

/// Chain data from a mempool.space host, broadcast through a blockstream
/// host. Both speak the esplora API.
pub struct MempoolClient {
    client: Client,
    mempool_url: String,
    broadcast_url: String,
}

impl MempoolClient {
    pub fn new(config: &WalletConfig) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| WalletError::Config(format!("http client: {e}")))?;
        Ok(Self {
            client,
            mempool_url: config.mempool_url.trim_end_matches('/').to_string(),
            broadcast_url: config.broadcast_url.trim_end_matches('/').to_string(),
        })
    }

    /// `{mempool}/{segment}api/{path}`
    pub fn api_url(&self, network: BtcNetwork, path: &str) -> String {
        format!("{}/{}api/{}", self.mempool_url, network.path_segment(), path)
    }

    /// `{broadcast}/{segment}api/tx`
    pub fn broadcast_endpoint(&self, network: BtcNetwork) -> String {
        format!("{}/{}api/tx", self.broadcast_url, network.path_segment())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, WalletError> {
        debug!(url, "chain data request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WalletError::Provider(format!("{url}: {status}: {body}")));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChainDataProvider for MempoolClient {
    async fn get_address_utxos(
        &self,
        network: BtcNetwork,
        address: &str,
    ) -> Result<Vec<Utxo>, WalletError> {
        let url = self.api_url(network, &format!("address/{address}/utxo"));
        self.get_json(&url).await
    }

    async fn get_address_transactions(
        &self,
        network: BtcNetwork,
        address: &str,
    ) -> Result<Vec<HistoricalTx>, WalletError> {
        let url = self.api_url(network, &format!("address/{address}/txs"));
        self.get_json(&url).await
    }

    async fn get_recommended_fee_rate(&self, network: BtcNetwork) -> Result<u64, WalletError> {
        let url = self.api_url(network, "v1/fees/recommended");
        let fees: RecommendedFees = self.get_json(&url).await?;
        Ok(fees.fastest_fee)
    }
}

#[async_trait]
impl BroadcastProvider for MempoolClient {
    async fn post_raw_transaction(
        &self,
        network: BtcNetwork,
        signed_hex: &str,
    ) -> Result<String, WalletError> {
        let url = self.broadcast_endpoint(network);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(signed_hex.to_string())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body.trim().to_string())
        } else {
            warn!(%status, body = %body, "broadcast rejected");
            Err(WalletError::BroadcastRejected(body))
        }
    }
}
