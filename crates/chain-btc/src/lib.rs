//! Bitcoin transaction construction for a Taproot web wallet.
//!
//! Resolves the network from an address, selects UTXOs in the order the
//! chain backend returns them, estimates the fee in two passes over a PSBT
//! draft, and reconciles balance and history from esplora-shaped chain data.
//! Nothing in this crate performs I/O or holds keys.

pub mod address;
pub mod error;
pub mod explorer;
pub mod fee;
pub mod history;
pub mod network;
pub mod transaction;
pub mod utxo;
