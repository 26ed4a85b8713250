use serde::{Deserialize, Serialize};

use crate::error::BtcError;

/// A single unspent transaction output (UTXO) as reported by the chain-data
/// backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction ID as a hex string (big-endian / display order).
    pub txid: String,
    /// Output index within the transaction.
    pub vout: u32,
    /// Value in satoshis.
    #[serde(rename = "value")]
    pub amount_sat: u64,
    /// Confirmation status, when the backend reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UtxoStatus>,
}

/// Confirmation status attached to a UTXO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoStatus {
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_time: Option<u64>,
}

impl Utxo {
    pub fn new(txid: impl Into<String>, vout: u32, amount_sat: u64) -> Self {
        Self {
            txid: txid.into(),
            vout,
            amount_sat,
            status: None,
        }
    }
}

/// Result of UTXO selection: the chosen UTXOs and their aggregate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtxoSelection {
    /// The selected UTXOs, in the order they were supplied.
    pub selected: Vec<Utxo>,
    /// Total value of the selected UTXOs in satoshis.
    pub total_sat: u64,
}

/// Select the shortest prefix of `utxos` whose value covers `target_sat`.
///
/// UTXOs are consumed strictly in the order given; there is no sorting and no
/// attempt to minimize the input count or the change. Each UTXO is taken
/// before the running total is compared, so a non-empty list always yields at
/// least one input.
pub fn select_utxos(utxos: &[Utxo], target_sat: u64) -> Result<UtxoSelection, BtcError> {
    let mut selected: Vec<Utxo> = Vec::new();
    let mut total_sat: u64 = 0;

    for utxo in utxos {
        selected.push(utxo.clone());
        total_sat = total_sat.saturating_add(utxo.amount_sat);
        if total_sat >= target_sat {
            return Ok(UtxoSelection {
                selected,
                total_sat,
            });
        }
    }

    if total_sat >= target_sat {
        return Ok(UtxoSelection {
            selected,
            total_sat,
        });
    }

    Err(BtcError::InsufficientFunds {
        have: total_sat,
        need: target_sat,
    })
}

/// UTXOs ordered largest first, for listing. Selection never uses this order.
pub fn sorted_by_value_desc(utxos: &[Utxo]) -> Vec<&Utxo> {
    let mut sorted: Vec<&Utxo> = utxos.iter().collect();
    sorted.sort_by(|a, b| b.amount_sat.cmp(&a.amount_sat));
    sorted
}
