use std::str::FromStr;

use bitcoin::Network;
use serde::{Deserialize, Serialize};

use crate::error::BtcError;

/// Address prefix that marks a testnet (or signet) address.
const TESTNET_PREFIX: &str = "tb";

/// Address prefix that marks a regtest address.
const REGTEST_PREFIX: &str = "bcrt";

/// Bitcoin networks a wallet address can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BtcNetwork {
    Mainnet,
    Testnet,
    Regtest,
}

impl BtcNetwork {
    /// Classify an address string by its human-readable prefix.
    ///
    /// Anything that is neither `tb...` nor `bcrt...` is treated as mainnet;
    /// no checksum or format validation happens here.
    pub fn from_address(address: &str) -> Self {
        if address.starts_with(TESTNET_PREFIX) {
            BtcNetwork::Testnet
        } else if address.starts_with(REGTEST_PREFIX) {
            BtcNetwork::Regtest
        } else {
            BtcNetwork::Mainnet
        }
    }

    /// Reject networks the wallet cannot operate on. Regtest is recognized
    /// but has no public chain-data backend.
    pub fn ensure_supported(self) -> Result<Self, BtcError> {
        match self {
            BtcNetwork::Regtest => Err(BtcError::UnsupportedNetwork(self)),
            other => Ok(other),
        }
    }

    /// Convert to the `bitcoin` crate's `Network` type.
    pub fn to_bitcoin_network(self) -> Network {
        match self {
            BtcNetwork::Mainnet => Network::Bitcoin,
            BtcNetwork::Testnet => Network::Testnet,
            BtcNetwork::Regtest => Network::Regtest,
        }
    }

    /// URL path segment inserted before REST and explorer paths.
    /// Empty for mainnet.
    pub fn path_segment(self) -> &'static str {
        match self {
            BtcNetwork::Mainnet => "",
            BtcNetwork::Testnet => "testnet/",
            BtcNetwork::Regtest => "regtest/",
        }
    }
}

impl std::fmt::Display for BtcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtcNetwork::Mainnet => write!(f, "mainnet"),
            BtcNetwork::Testnet => write!(f, "testnet"),
            BtcNetwork::Regtest => write!(f, "regtest"),
        }
    }
}

impl FromStr for BtcNetwork {
    type Err = BtcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "bitcoin" => Ok(BtcNetwork::Mainnet),
            "testnet" => Ok(BtcNetwork::Testnet),
            "regtest" => Ok(BtcNetwork::Regtest),
            other => Err(BtcError::InvalidNetwork(other.to_string())),
        }
    }
}
