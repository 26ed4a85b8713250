//! Two-pass fee estimation.
//!
//! The fee depends on the serialized size, the size depends on which inputs
//! and outputs are present, and those depend on the fee. The loop is broken by
//! measuring a zero-fee draft first and funding the real transaction with the
//! fee that draft implies. The two passes share no state: the second pass is a
//! pure function of the first pass's measured size.

use bitcoin::{Address, Amount, TxOut};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{parse_address, TaprootSpend};
use crate::error::BtcError;
use crate::network::BtcNetwork;
use crate::transaction::DraftTransaction;
use crate::utxo::{select_utxos, Utxo, UtxoSelection};

/// The single payment output of a send request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    pub amount_sat: u64,
}

/// Funding decided by the final pass, before any transaction is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingPlan {
    pub selection: UtxoSelection,
    pub fee_sat: u64,
    /// `None` when the selection covers amount plus fee exactly.
    pub change_sat: Option<u64>,
}

/// Result of [`estimate`]: the final unsigned draft plus the numbers it was
/// funded with.
#[derive(Debug, Clone)]
pub struct FundedTransaction {
    pub draft: DraftTransaction,
    /// Serialized size of the sizing-pass draft.
    pub estimated_size: u64,
    pub fee_sat: u64,
    pub change_sat: Option<u64>,
    pub selected_total_sat: u64,
}

/// Compute the final-pass funding for a sizing-pass size.
///
/// The fee is `estimated_size * fee_rate_sat_vbyte`. Selection runs again over
/// the same `utxos` with `amount + fee` as the target, which may pick a longer
/// prefix than the sizing pass did. No dust threshold is applied: any positive
/// remainder becomes change.
pub fn plan_final_pass(
    utxos: &[Utxo],
    amount_sat: u64,
    estimated_size: u64,
    fee_rate_sat_vbyte: u64,
) -> Result<FundingPlan, BtcError> {
    let fee_sat = estimated_size.checked_mul(fee_rate_sat_vbyte).ok_or_else(|| {
        BtcError::TransactionBuildError(format!(
            "fee overflows: {estimated_size} bytes at {fee_rate_sat_vbyte} sat/vB"
        ))
    })?;
    let target_sat = amount_sat
        .checked_add(fee_sat)
        .ok_or_else(|| BtcError::TransactionBuildError("target amount overflows".into()))?;

    let selection = select_utxos(utxos, target_sat)?;
    let remainder = selection.total_sat - target_sat;
    let change_sat = (remainder > 0).then_some(remainder);

    Ok(FundingPlan {
        selection,
        fee_sat,
        change_sat,
    })
}

/// Build the final unsigned transaction paying `recipient`, returning any
/// change to `change_address`.
pub fn estimate(
    utxos: &[Utxo],
    recipient: &Recipient,
    change_address: &str,
    spend: &TaprootSpend,
    fee_rate_sat_vbyte: u64,
    network: BtcNetwork,
) -> Result<FundedTransaction, BtcError> {
    let recipient_addr = parse_address(&recipient.address, network)?;
    let change_addr = parse_address(change_address, network)?;

    let estimated_size = sizing_pass(utxos, recipient, &recipient_addr, &change_addr, spend)?;
    let plan = plan_final_pass(utxos, recipient.amount_sat, estimated_size, fee_rate_sat_vbyte)?;

    let mut outputs = vec![payment_output(&recipient_addr, recipient.amount_sat)];
    if let Some(change_sat) = plan.change_sat {
        outputs.push(payment_output(&change_addr, change_sat));
    }
    let draft = DraftTransaction::build(&plan.selection.selected, spend, outputs)?;

    debug!(
        inputs = plan.selection.selected.len(),
        estimated_size,
        fee_sat = plan.fee_sat,
        change_sat = plan.change_sat.unwrap_or(0),
        "final pass funded"
    );

    Ok(FundedTransaction {
        draft,
        estimated_size,
        fee_sat: plan.fee_sat,
        change_sat: plan.change_sat,
        selected_total_sat: plan.selection.total_sat,
    })
}

/// Zero-fee draft with a placeholder change output, measured in bytes. The
/// placeholder reserves the change slot so its bytes are paid for.
fn sizing_pass(
    utxos: &[Utxo],
    recipient: &Recipient,
    recipient_addr: &Address,
    change_addr: &Address,
    spend: &TaprootSpend,
) -> Result<u64, BtcError> {
    let selection = select_utxos(utxos, recipient.amount_sat)?;
    let outputs = vec![
        payment_output(recipient_addr, recipient.amount_sat),
        payment_output(change_addr, 0),
    ];
    let draft = DraftTransaction::build(&selection.selected, spend, outputs)?;
    let size = draft.size_in_bytes();

    debug!(
        inputs = selection.selected.len(),
        size, "sizing pass measured"
    );
    Ok(size)
}

fn payment_output(address: &Address, amount_sat: u64) -> TxOut {
    TxOut {
        value: Amount::from_sat(amount_sat),
        script_pubkey: address.script_pubkey(),
    }
}
