//! Wallet session for a browser-extension Bitcoin signer.
//!
//! Keys stay with the injected [`SigningProvider`]; chain data and broadcast
//! come from [`ChainDataProvider`] and [`BroadcastProvider`], by default the
//! esplora-speaking [`MempoolClient`]. Transaction construction lives in
//! `chain_btc`.

pub mod config;
pub mod error;
pub mod logging;
pub mod mempool;
pub mod provider;
pub mod session;
pub mod types;
pub mod view;

pub use chain_btc::network::BtcNetwork;
pub use config::WalletConfig;
pub use error::WalletError;
pub use mempool::MempoolClient;
pub use provider::{BroadcastProvider, ChainDataProvider, SigningProvider};
pub use session::{WalletSession, WalletSessionBuilder, WalletState};
pub use types::{AccountEvent, SendReceipt, SendRequest, SignedTransaction, WalletAddress};
