use chain_btc::error::BtcError;
use chain_btc::network::BtcNetwork;
use thiserror::Error;

/// Errors surfaced by a wallet session. Each one is scoped to a single reload
/// or a single send attempt; the session stays usable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("No signing provider available. Please install a compatible wallet extension")]
    MissingSigningProvider,

    #[error("Unsupported network: {0}. Please change the network in your account")]
    UnsupportedNetwork(BtcNetwork),

    #[error("Insufficient funds: have {have} sat, need {need} sat")]
    InsufficientFunds { have: u64, need: u64 },

    #[error("No spend script: {0}")]
    NoSpendScript(String),

    /// Raw text returned by the broadcast endpoint.
    #[error("Broadcast rejected: {0}")]
    BroadcastRejected(String),

    #[error("Address not loaded")]
    MissingAddress,

    #[error("UTXOs not loaded or no UTXOs")]
    MissingUtxos,

    #[error("Network not loaded")]
    MissingNetwork,

    #[error("Please send at least 1 sat")]
    EmptyAmount,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("BTC: {0}")]
    Btc(BtcError),
}

impl From<BtcError> for WalletError {
    fn from(e: BtcError) -> Self {
        match e {
            BtcError::InsufficientFunds { have, need } => {
                WalletError::InsufficientFunds { have, need }
            }
            BtcError::UnsupportedNetwork(network) => WalletError::UnsupportedNetwork(network),
            BtcError::NoSpendScript(reason) => WalletError::NoSpendScript(reason),
            other => WalletError::Btc(other),
        }
    }
}

impl From<reqwest::Error> for WalletError {
    fn from(e: reqwest::Error) -> Self {
        WalletError::Provider(e.to_string())
    }
}
