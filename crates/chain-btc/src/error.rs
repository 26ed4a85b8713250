use thiserror::Error;

use crate::network::BtcNetwork;

/// Bitcoin chain operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BtcError {
    #[error("insufficient funds: have {have} sat, need {need} sat")]
    InsufficientFunds { have: u64, need: u64 },

    #[error("unsupported network: {0}")]
    UnsupportedNetwork(BtcNetwork),

    #[error("no spend script: {0}")]
    NoSpendScript(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("invalid network: {0}")]
    InvalidNetwork(String),
}
