//! Capabilities the session depends on, injected at construction.

use async_trait::async_trait;
use chain_btc::history::HistoricalTx;
use chain_btc::network::BtcNetwork;
use chain_btc::utxo::Utxo;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::WalletError;
use crate::types::{AccountEvent, SignedTransaction, WalletAddress};

/// Key custody. Holds the keys, signs PSBTs, and reports account switches.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    async fn enable(&self) -> Result<(), WalletError>;

    async fn get_address(&self) -> Result<WalletAddress, WalletError>;

    /// Sign a hex-encoded unsigned PSBT. The result is opaque to the wallet and
    /// is broadcast as-is.
    async fn sign_transaction(&self, unsigned_hex: &str) -> Result<SignedTransaction, WalletError>;

    /// Register the session's single event sink. Providers push
    /// [`AccountEvent::AccountChanged`] whenever the active account changes.
    fn subscribe_account_changed(&self, sender: UnboundedSender<AccountEvent>);
}

/// Read access to chain data for one address.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    async fn get_address_utxos(
        &self,
        network: BtcNetwork,
        address: &str,
    ) -> Result<Vec<Utxo>, WalletError>;

    async fn get_address_transactions(
        &self,
        network: BtcNetwork,
        address: &str,
    ) -> Result<Vec<HistoricalTx>, WalletError>;

    /// Recommended fee rate in sat/vB.
    async fn get_recommended_fee_rate(&self, network: BtcNetwork) -> Result<u64, WalletError>;
}

#[async_trait]
pub trait BroadcastProvider: Send + Sync {
    /// Submit a signed transaction and return its txid. A rejection is
    /// reported as [`WalletError::BroadcastRejected`] carrying the raw response
    /// body.
    async fn post_raw_transaction(
        &self,
        network: BtcNetwork,
        signed_hex: &str,
    ) -> Result<String, WalletError>;
}
