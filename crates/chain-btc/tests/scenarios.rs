//! End-to-end send scenarios over the pure transaction-construction API.

use chain_btc::address::TaprootSpend;
use chain_btc::error::BtcError;
use chain_btc::fee::{estimate, plan_final_pass, Recipient};
use chain_btc::history::{
    classify, Direction, HistoricalInput, HistoricalOutput, HistoricalTx, PrevOut, TxStatus,
};
use chain_btc::network::BtcNetwork;
use chain_btc::utxo::Utxo;

const PUBKEY_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
const RECIPIENT: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

fn utxos(values: &[u64]) -> Vec<Utxo> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Utxo::new(format!("{:064x}", i + 1), i as u32, *v))
        .collect()
}

#[test]
fn scenario_a_fee_from_sizing_pass_selects_first_utxo() {
    let plan = plan_final_pass(&utxos(&[100_000, 50_000]), 80_000, 150, 2).unwrap();
    assert_eq!(plan.fee_sat, 300);
    assert_eq!(plan.selection.selected.len(), 1);
    assert_eq!(plan.selection.selected[0].amount_sat, 100_000);
    assert_eq!(plan.change_sat, Some(19_700));
}

#[test]
fn scenario_a_full_estimate_keeps_the_same_shape() {
    let spend = TaprootSpend::from_public_key_hex(PUBKEY_HEX).unwrap();
    let wallet = spend.address(BtcNetwork::Mainnet).to_string();
    let funded = estimate(
        &utxos(&[100_000, 50_000]),
        &Recipient {
            address: RECIPIENT.into(),
            amount_sat: 80_000,
        },
        &wallet,
        &spend,
        2,
        BtcNetwork::Mainnet,
    )
    .unwrap();

    assert_eq!(funded.draft.inputs().len(), 1);
    assert_eq!(funded.fee_sat, funded.estimated_size * 2);
    assert_eq!(funded.change_sat, Some(100_000 - 80_000 - funded.fee_sat));
}

#[test]
fn scenario_b_regtest_address_is_unsupported() {
    let network = BtcNetwork::from_address("bcrt1qw508d6qejxtdg4y5r3zarvary0c5xw7kygt080");
    assert_eq!(network, BtcNetwork::Regtest);
    assert_eq!(
        network.ensure_supported(),
        Err(BtcError::UnsupportedNetwork(BtcNetwork::Regtest))
    );
}

#[test]
fn scenario_c_sizing_pass_runs_out_of_funds() {
    let spend = TaprootSpend::from_public_key_hex(PUBKEY_HEX).unwrap();
    let wallet = spend.address(BtcNetwork::Mainnet).to_string();
    let err = estimate(
        &utxos(&[30_000]),
        &Recipient {
            address: RECIPIENT.into(),
            amount_sat: 50_000,
        },
        &wallet,
        &spend,
        2,
        BtcNetwork::Mainnet,
    )
    .unwrap_err();
    assert_eq!(err, BtcError::InsufficientFunds { have: 30_000, need: 50_000 });
}

#[test]
fn scenario_d_outgoing_with_change_back_to_self() {
    let me = "bc1pme";
    let tx = HistoricalTx {
        txid: "ab".repeat(32),
        inputs: vec![HistoricalInput {
            prevout: Some(PrevOut {
                address: Some(me.into()),
                amount_sat: 25_500,
            }),
        }],
        outputs: vec![
            HistoricalOutput {
                address: Some("bc1qother".into()),
                amount_sat: 20_000,
            },
            HistoricalOutput {
                address: Some(me.into()),
                amount_sat: 5_000,
            },
        ],
        fee_sat: 500,
        status: TxStatus::default(),
    };
    let c = classify(&tx, me);
    assert_eq!(c.direction, Direction::Outgoing);
    assert_eq!(c.net_sat, 20_500);
}
