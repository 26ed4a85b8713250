//! Balance and transaction-history reconciliation from raw chain data.
//!
//! Direction is decided from the first input alone: a transaction is outgoing
//! when its first input spends an output of the wallet address. Transactions
//! whose inputs mix owners are therefore classified by whoever owns input 0.

use serde::{Deserialize, Serialize};

use crate::utxo::Utxo;

/// A transaction touching the wallet address, in the esplora JSON shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalTx {
    pub txid: String,
    #[serde(rename = "vin")]
    pub inputs: Vec<HistoricalInput>,
    #[serde(rename = "vout")]
    pub outputs: Vec<HistoricalOutput>,
    #[serde(rename = "fee")]
    pub fee_sat: u64,
    pub status: TxStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalInput {
    /// Absent for coinbase inputs.
    #[serde(default)]
    pub prevout: Option<PrevOut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrevOut {
    #[serde(rename = "scriptpubkey_address", default)]
    pub address: Option<String>,
    #[serde(rename = "value")]
    pub amount_sat: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalOutput {
    /// Absent for scripts without an address form (e.g. `OP_RETURN`).
    #[serde(rename = "scriptpubkey_address", default)]
    pub address: Option<String>,
    #[serde(rename = "value")]
    pub amount_sat: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    pub confirmed: bool,
    #[serde(default)]
    pub block_time: Option<u64>,
}

impl HistoricalInput {
    pub fn prevout_address(&self) -> Option<&str> {
        self.prevout.as_ref()?.address.as_deref()
    }
}

impl HistoricalOutput {
    fn pays(&self, address: &str) -> bool {
        self.address.as_deref() == Some(address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Direction and net wallet effect of one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub direction: Direction,
    /// For outgoing: value paid to other addresses plus the fee.
    /// For incoming: value paid to the wallet address.
    pub net_sat: u64,
}

/// Totals over a transaction history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSummary {
    pub total_received: u64,
    pub total_sent: u64,
    pub incoming_count: usize,
    pub outgoing_count: usize,
}

/// Sum of all UTXO values, saturating at `u64::MAX`.
pub fn balance(utxos: &[Utxo]) -> u64 {
    utxos
        .iter()
        .fold(0u64, |acc, u| acc.saturating_add(u.amount_sat))
}

fn sum_outputs<'a>(outputs: impl Iterator<Item = &'a HistoricalOutput>) -> u64 {
    outputs.fold(0u64, |acc, out| acc.saturating_add(out.amount_sat))
}

pub fn classify(tx: &HistoricalTx, wallet_address: &str) -> Classification {
    let outgoing = tx
        .inputs
        .first()
        .and_then(HistoricalInput::prevout_address)
        == Some(wallet_address);

    if outgoing {
        let paid_out = sum_outputs(tx.outputs.iter().filter(|out| !out.pays(wallet_address)));
        Classification {
            direction: Direction::Outgoing,
            net_sat: paid_out.saturating_add(tx.fee_sat),
        }
    } else {
        let received = sum_outputs(tx.outputs.iter().filter(|out| out.pays(wallet_address)));
        Classification {
            direction: Direction::Incoming,
            net_sat: received,
        }
    }
}

pub fn summarize(transactions: &[HistoricalTx], wallet_address: &str) -> WalletSummary {
    transactions
        .iter()
        .map(|tx| classify(tx, wallet_address))
        .fold(WalletSummary::default(), |mut summary, c| {
            match c.direction {
                Direction::Incoming => {
                    summary.total_received = summary.total_received.saturating_add(c.net_sat);
                    summary.incoming_count += 1;
                }
                Direction::Outgoing => {
                    summary.total_sent = summary.total_sent.saturating_add(c.net_sat);
                    summary.outgoing_count += 1;
                }
            }
            summary
        })
}
