//! Wallet session: the single owner of wallet state.
//!
//! A reload walks address → network → UTXOs → fee rate → history, awaiting
//! each step in turn, and replaces the whole [`WalletState`] only once every
//! step has succeeded. A send validates its preconditions synchronously,
//! builds the draft in two pure passes, then signs, broadcasts and reloads.
//!
//! Reloads are not serialized. An account-change notification that arrives
//! while a reload is pending starts a second one, and whichever finishes last
//! overwrites the state regardless of which started first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chain_btc::address::TaprootSpend;
use chain_btc::explorer;
use chain_btc::fee::{self, FundedTransaction};
use chain_btc::history::{self, HistoricalTx, WalletSummary};
use chain_btc::network::BtcNetwork;
use chain_btc::utxo::Utxo;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::mempool::MempoolClient;
use crate::provider::{BroadcastProvider, ChainDataProvider, SigningProvider};
use crate::types::{AccountEvent, SendReceipt, SendRequest, WalletAddress};

/// Everything one completed reload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletState {
    pub address: WalletAddress,
    pub network: BtcNetwork,
    pub utxos: Vec<Utxo>,
    pub transactions: Vec<HistoricalTx>,
    pub recommended_fee_rate: u64,
}

impl WalletState {
    pub fn balance(&self) -> u64 {
        history::balance(&self.utxos)
    }

    pub fn summary(&self) -> WalletSummary {
        history::summarize(&self.transactions, &self.address.address)
    }
}

/// What a send needs from the session, each piece possibly not loaded yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SendContext<'a> {
    pub address: Option<&'a WalletAddress>,
    pub network: Option<BtcNetwork>,
    pub utxos: Option<&'a [Utxo]>,
    pub recommended_fee_rate: u64,
}

impl<'a> SendContext<'a> {
    pub fn from_state(state: Option<&'a WalletState>) -> Self {
        match state {
            Some(state) => Self {
                address: Some(&state.address),
                network: Some(state.network),
                utxos: Some(&state.utxos),
                recommended_fee_rate: state.recommended_fee_rate,
            },
            None => Self::default(),
        }
    }
}

/// A funded, unsigned transaction ready for the signer.
#[derive(Debug, Clone)]
pub struct PreparedSend {
    pub network: BtcNetwork,
    pub fee_rate_sat_vbyte: u64,
    pub funded: FundedTransaction,
}

/// Check preconditions and build the final draft. No provider is called, so
/// any error here leaves no side effects behind.
pub fn prepare_send(
    ctx: SendContext<'_>,
    request: &SendRequest,
) -> Result<PreparedSend, WalletError> {
    let address = ctx.address.ok_or(WalletError::MissingAddress)?;
    let network = ctx.network.ok_or(WalletError::MissingNetwork)?;
    let utxos = match ctx.utxos {
        Some(utxos) if !utxos.is_empty() => utxos,
        _ => return Err(WalletError::MissingUtxos),
    };
    if request.amount_sat == 0 {
        return Err(WalletError::EmptyAmount);
    }

    let fee_rate_sat_vbyte = request
        .fee_rate_sat_vbyte
        .unwrap_or(ctx.recommended_fee_rate);
    let spend = TaprootSpend::from_public_key_hex(&address.public_key)?;

    let funded = fee::estimate(
        utxos,
        &request.recipient(),
        &address.address,
        &spend,
        fee_rate_sat_vbyte,
        network,
    )?;

    Ok(PreparedSend {
        network,
        fee_rate_sat_vbyte,
        funded,
    })
}

pub struct WalletSession {
    signer: Arc<dyn SigningProvider>,
    chain: Arc<dyn ChainDataProvider>,
    broadcaster: Arc<dyn BroadcastProvider>,
    config: WalletConfig,
    state: RwLock<Option<Arc<WalletState>>>,
    listening: AtomicBool,
}

/// Assembles a [`WalletSession`] from injected providers.
///
/// A signing provider is mandatory. Chain data and broadcast default to a
/// [`MempoolClient`] built from the config.
#[derive(Default)]
pub struct WalletSessionBuilder {
    signer: Option<Arc<dyn SigningProvider>>,
    chain: Option<Arc<dyn ChainDataProvider>>,
    broadcaster: Option<Arc<dyn BroadcastProvider>>,
    config: Option<WalletConfig>,
}

impl WalletSessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signer(mut self, signer: Arc<dyn SigningProvider>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn chain_data(mut self, chain: Arc<dyn ChainDataProvider>) -> Self {
        self.chain = Some(chain);
        self
    }

    pub fn broadcaster(mut self, broadcaster: Arc<dyn BroadcastProvider>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn config(mut self, config: WalletConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<WalletSession, WalletError> {
        let signer = self.signer.ok_or(WalletError::MissingSigningProvider)?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let (chain, broadcaster) = match (self.chain, self.broadcaster) {
            (Some(chain), Some(broadcaster)) => (chain, broadcaster),
            (chain, broadcaster) => {
                let client = Arc::new(MempoolClient::new(&config)?);
                (
                    chain.unwrap_or_else(|| client.clone() as Arc<dyn ChainDataProvider>),
                    broadcaster.unwrap_or_else(|| client as Arc<dyn BroadcastProvider>),
                )
            }
        };

        Ok(WalletSession {
            signer,
            chain,
            broadcaster,
            config,
            state: RwLock::new(None),
            listening: AtomicBool::new(false),
        })
    }
}

impl WalletSession {
    pub fn builder() -> WalletSessionBuilder {
        WalletSessionBuilder::new()
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Snapshot of the last completed reload.
    pub async fn state(&self) -> Option<Arc<WalletState>> {
        self.state.read().await.clone()
    }

    /// Fetch everything from the providers and replace the wallet state.
    ///
    /// On error the previous state is left untouched. Regtest is rejected
    /// right after the address is known, before any chain-data request.
    pub async fn reload(&self) -> Result<Arc<WalletState>, WalletError> {
        self.signer.enable().await?;
        let address = self.signer.get_address().await?;

        let network = BtcNetwork::from_address(&address.address).ensure_supported()?;
        info!(address = %address.address, %network, "wallet address loaded");

        let utxos = self
            .chain
            .get_address_utxos(network, &address.address)
            .await?;
        let recommended_fee_rate = self.chain.get_recommended_fee_rate(network).await?;
        let transactions = self
            .chain
            .get_address_transactions(network, &address.address)
            .await?;

        debug!(
            utxos = utxos.len(),
            transactions = transactions.len(),
            recommended_fee_rate,
            "chain data loaded"
        );

        let state = Arc::new(WalletState {
            address,
            network,
            utxos,
            transactions,
            recommended_fee_rate,
        });
        *self.state.write().await = Some(Arc::clone(&state));
        Ok(state)
    }

    /// Build, sign and broadcast a payment, then reload.
    ///
    /// Nothing is retried. A failed reload after a successful broadcast is
    /// logged and does not turn the send into an error.
    pub async fn send(&self, request: &SendRequest) -> Result<SendReceipt, WalletError> {
        let state = self.state().await;
        let prepared = prepare_send(SendContext::from_state(state.as_deref()), request)?;
        let funded = &prepared.funded;

        info!(
            amount_sat = request.amount_sat,
            fee_sat = funded.fee_sat,
            fee_rate = prepared.fee_rate_sat_vbyte,
            inputs = funded.draft.inputs().len(),
            "requesting signature"
        );
        let signed = self
            .signer
            .sign_transaction(&funded.draft.serialize_hex())
            .await?;

        let txid = self
            .broadcaster
            .post_raw_transaction(prepared.network, &signed.signed_hex)
            .await?;
        info!(%txid, "transaction broadcast");

        if let Err(e) = self.reload().await {
            warn!(error = %e, "reload after send failed");
        }

        Ok(SendReceipt {
            explorer_url: explorer::transaction_url(
                &self.config.explorer_url,
                &txid,
                prepared.network,
            ),
            txid,
            fee_sat: funded.fee_sat,
            change_sat: funded.change_sat,
        })
    }

    /// Register the session's account-change handler with the signing
    /// provider. Each notification spawns a full reload.
    ///
    /// Only the first call registers; later calls return `None`.
    pub fn spawn_account_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return None;
        }

        let (sender, mut events) = mpsc::unbounded_channel();
        self.signer.subscribe_account_changed(sender);

        let session = Arc::clone(self);
        Some(tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    AccountEvent::AccountChanged => {
                        info!("account changed, reloading");
                        let session = Arc::clone(&session);
                        tokio::spawn(async move {
                            if let Err(e) = session.reload().await {
                                warn!(error = %e, "reload after account change failed");
                            }
                        });
                    }
                }
            }
            debug!("account event channel closed");
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBKEY_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const RECIPIENT: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

    fn wallet_address() -> WalletAddress {
        let spend = TaprootSpend::from_public_key_hex(PUBKEY_HEX).unwrap();
        WalletAddress {
            address: spend.address(BtcNetwork::Mainnet).to_string(),
            derivation_path: "m/86'/0'/0'/0/0".into(),
            index: 0,
            public_key: PUBKEY_HEX.into(),
        }
    }

    fn utxos(values: &[u64]) -> Vec<Utxo> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Utxo::new(format!("{:064x}", i + 1), i as u32, *v))
            .collect()
    }

    fn request(amount_sat: u64) -> SendRequest {
        SendRequest {
            address: RECIPIENT.into(),
            amount_sat,
            fee_rate_sat_vbyte: Some(2),
        }
    }

    #[test]
    fn missing_address_is_checked_first() {
        let err = prepare_send(SendContext::default(), &request(0)).unwrap_err();
        assert_eq!(err, WalletError::MissingAddress);
    }

    #[test]
    fn missing_network() {
        let addr = wallet_address();
        let ctx = SendContext {
            address: Some(&addr),
            ..SendContext::default()
        };
        assert_eq!(
            prepare_send(ctx, &request(1_000)).unwrap_err(),
            WalletError::MissingNetwork
        );
    }

    #[test]
    fn missing_or_empty_utxos() {
        let addr = wallet_address();
        let mut ctx = SendContext {
            address: Some(&addr),
            network: Some(BtcNetwork::Mainnet),
            ..SendContext::default()
        };
        assert_eq!(
            prepare_send(ctx, &request(1_000)).unwrap_err(),
            WalletError::MissingUtxos
        );
        ctx.utxos = Some(&[]);
        assert_eq!(
            prepare_send(ctx, &request(1_000)).unwrap_err(),
            WalletError::MissingUtxos
        );
    }

    #[test]
    fn zero_amount_is_empty() {
        let addr = wallet_address();
        let available = utxos(&[10_000]);
        let ctx = SendContext {
            address: Some(&addr),
            network: Some(BtcNetwork::Mainnet),
            utxos: Some(&available),
            recommended_fee_rate: 1,
        };
        assert_eq!(
            prepare_send(ctx, &request(0)).unwrap_err(),
            WalletError::EmptyAmount
        );
    }

    #[test]
    fn bad_public_key_has_no_spend_script() {
        let mut addr = wallet_address();
        addr.public_key = "02abcd".into();
        let available = utxos(&[10_000]);
        let ctx = SendContext {
            address: Some(&addr),
            network: Some(BtcNetwork::Mainnet),
            utxos: Some(&available),
            recommended_fee_rate: 1,
        };
        assert!(matches!(
            prepare_send(ctx, &request(1_000)).unwrap_err(),
            WalletError::NoSpendScript(_)
        ));
    }

    #[test]
    fn insufficient_funds_surfaces_as_wallet_error() {
        let addr = wallet_address();
        let available = utxos(&[30_000]);
        let ctx = SendContext {
            address: Some(&addr),
            network: Some(BtcNetwork::Mainnet),
            utxos: Some(&available),
            recommended_fee_rate: 1,
        };
        assert_eq!(
            prepare_send(ctx, &request(50_000)).unwrap_err(),
            WalletError::InsufficientFunds {
                have: 30_000,
                need: 50_000
            }
        );
    }

    #[test]
    fn fee_rate_defaults_to_recommended() {
        let addr = wallet_address();
        let available = utxos(&[100_000]);
        let ctx = SendContext {
            address: Some(&addr),
            network: Some(BtcNetwork::Mainnet),
            utxos: Some(&available),
            recommended_fee_rate: 7,
        };
        let req = SendRequest {
            fee_rate_sat_vbyte: None,
            ..request(10_000)
        };
        let prepared = prepare_send(ctx, &req).unwrap();
        assert_eq!(prepared.fee_rate_sat_vbyte, 7);
        assert_eq!(
            prepared.funded.fee_sat,
            prepared.funded.estimated_size * 7
        );
    }

    #[test]
    fn explicit_fee_rate_wins() {
        let addr = wallet_address();
        let available = utxos(&[100_000]);
        let ctx = SendContext {
            address: Some(&addr),
            network: Some(BtcNetwork::Mainnet),
            utxos: Some(&available),
            recommended_fee_rate: 7,
        };
        let prepared = prepare_send(ctx, &request(10_000)).unwrap();
        assert_eq!(prepared.fee_rate_sat_vbyte, 2);
    }

    #[test]
    fn state_balance_and_summary() {
        let state = WalletState {
            address: wallet_address(),
            network: BtcNetwork::Mainnet,
            utxos: utxos(&[100_000, 50_000]),
            transactions: vec![],
            recommended_fee_rate: 3,
        };
        assert_eq!(state.balance(), 150_000);
        assert_eq!(state.summary(), WalletSummary::default());

        let ctx = SendContext::from_state(Some(&state));
        assert_eq!(ctx.network, Some(BtcNetwork::Mainnet));
        assert_eq!(ctx.recommended_fee_rate, 3);
        assert_eq!(ctx.utxos.map(<[Utxo]>::len), Some(2));
    }

    #[test]
    fn builder_without_signer_fails() {
        let err = WalletSession::builder().build().err().unwrap();
        assert_eq!(err, WalletError::MissingSigningProvider);
    }
}
