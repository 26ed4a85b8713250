use bitcoin::absolute::LockTime;
use bitcoin::psbt::Psbt;
use bitcoin::script::ScriptBuf;
use bitcoin::transaction::Version;
use bitcoin::{Amount, OutPoint, Sequence, Transaction, TxIn, TxOut, Txid, Witness};

use crate::address::TaprootSpend;
use crate::error::BtcError;
use crate::utxo::Utxo;

/// An unsigned Taproot transaction, carried as a PSBT so the signing provider
/// receives every prevout and the internal key alongside the transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftTransaction {
    psbt: Psbt,
}

impl DraftTransaction {
    /// Assemble a draft from already-selected inputs and ordered outputs.
    ///
    /// Input order is kept exactly as given, and so is output order (the
    /// caller puts the recipient first and any change last). Every input is
    /// assumed to be locked by `spend`.
    pub fn build(
        inputs: &[Utxo],
        spend: &TaprootSpend,
        outputs: Vec<TxOut>,
    ) -> Result<Self, BtcError> {
        if inputs.is_empty() {
            return Err(BtcError::TransactionBuildError("no inputs selected".into()));
        }

        let mut tx_inputs = Vec::with_capacity(inputs.len());
        let mut input_total: u64 = 0;
        for utxo in inputs {
            let txid: Txid = utxo
                .txid
                .parse()
                .map_err(|e| BtcError::TransactionBuildError(format!("invalid txid: {e}")))?;

            tx_inputs.push(TxIn {
                previous_output: OutPoint::new(txid, utxo.vout),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            });
            input_total = input_total.checked_add(utxo.amount_sat).ok_or_else(|| {
                BtcError::TransactionBuildError("input total overflows".into())
            })?;
        }

        let output_total = outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value.to_sat()))
            .ok_or_else(|| BtcError::TransactionBuildError("output total overflows".into()))?;
        if output_total > input_total {
            return Err(BtcError::TransactionBuildError(format!(
                "outputs ({output_total} sat) exceed inputs ({input_total} sat)"
            )));
        }

        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: tx_inputs,
            output: outputs,
        };

        let mut psbt = Psbt::from_unsigned_tx(tx)
            .map_err(|e| BtcError::TransactionBuildError(format!("psbt: {e}")))?;

        for (psbt_input, utxo) in psbt.inputs.iter_mut().zip(inputs) {
            psbt_input.witness_utxo = Some(TxOut {
                value: Amount::from_sat(utxo.amount_sat),
                script_pubkey: spend.script_pubkey.clone(),
            });
            psbt_input.tap_internal_key = Some(spend.internal_key);
        }

        Ok(Self { psbt })
    }

    /// Canonical BIP-174 encoding of the unsigned transaction.
    pub fn serialize(&self) -> Vec<u8> {
        self.psbt.serialize()
    }

    /// Hex form of [`serialize`](Self::serialize), as handed to the signer.
    pub fn serialize_hex(&self) -> String {
        self.psbt.serialize_hex()
    }

    /// Length of the serialized draft in bytes.
    pub fn size_in_bytes(&self) -> u64 {
        self.serialize().len() as u64
    }

    pub fn input_total_sat(&self) -> u64 {
        self.psbt
            .inputs
            .iter()
            .filter_map(|input| input.witness_utxo.as_ref())
            .map(|prevout| prevout.value.to_sat())
            .sum()
    }

    pub fn output_total_sat(&self) -> u64 {
        self.psbt
            .unsigned_tx
            .output
            .iter()
            .map(|out| out.value.to_sat())
            .sum()
    }

    /// Implicit fee: inputs minus outputs. Never negative, `build` checks it.
    pub fn fee_sat(&self) -> u64 {
        self.input_total_sat() - self.output_total_sat()
    }

    pub fn inputs(&self) -> &[TxIn] {
        &self.psbt.unsigned_tx.input
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.psbt.unsigned_tx.output
    }

    pub fn psbt(&self) -> &Psbt {
        &self.psbt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::parse_address;
    use crate::network::BtcNetwork;

    const PUBKEY_HEX: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const RECIPIENT: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

    fn spend() -> TaprootSpend {
        TaprootSpend::from_public_key_hex(PUBKEY_HEX).unwrap()
    }

    fn make_test_utxo(fill: char, vout: u32, amount_sat: u64) -> Utxo {
        Utxo::new(fill.to_string().repeat(64), vout, amount_sat)
    }

    fn pay(amount_sat: u64) -> TxOut {
        TxOut {
            value: Amount::from_sat(amount_sat),
            script_pubkey: parse_address(RECIPIENT, BtcNetwork::Mainnet)
                .unwrap()
                .script_pubkey(),
        }
    }

    fn change(amount_sat: u64) -> TxOut {
        TxOut {
            value: Amount::from_sat(amount_sat),
            script_pubkey: spend().script_pubkey,
        }
    }

    #[test]
    fn build_preserves_input_and_output_order() {
        let utxos = vec![
            make_test_utxo('b', 1, 30_000),
            make_test_utxo('a', 0, 40_000),
        ];
        let draft = DraftTransaction::build(&utxos, &spend(), vec![pay(50_000), change(19_000)])
            .unwrap();

        assert_eq!(draft.inputs().len(), 2);
        assert_eq!(draft.inputs()[0].previous_output.vout, 1);
        assert_eq!(
            draft.inputs()[0].previous_output.txid.to_string(),
            "b".repeat(64)
        );
        assert_eq!(draft.inputs()[1].previous_output.vout, 0);
        assert_eq!(draft.outputs()[0].value.to_sat(), 50_000);
        assert_eq!(draft.outputs()[1].value.to_sat(), 19_000);
        assert_eq!(draft.fee_sat(), 1_000);
    }

    #[test]
    fn inputs_carry_witness_utxo_and_internal_key() {
        let spend = spend();
        let utxos = vec![make_test_utxo('c', 2, 75_000)];
        let draft = DraftTransaction::build(&utxos, &spend, vec![pay(70_000)]).unwrap();

        let input = &draft.psbt().inputs[0];
        let prevout = input.witness_utxo.as_ref().unwrap();
        assert_eq!(prevout.value.to_sat(), 75_000);
        assert_eq!(prevout.script_pubkey, spend.script_pubkey);
        assert_eq!(input.tap_internal_key, Some(spend.internal_key));
        assert!(input.tap_key_sig.is_none());
    }

    #[test]
    fn unsigned_fields_use_fixed_defaults() {
        let utxos = vec![make_test_utxo('d', 0, 10_000)];
        let draft = DraftTransaction::build(&utxos, &spend(), vec![pay(9_000)]).unwrap();
        let tx = &draft.psbt().unsigned_tx;
        assert_eq!(tx.version, Version::TWO);
        assert_eq!(tx.lock_time, LockTime::ZERO);
        assert_eq!(tx.input[0].sequence, Sequence::MAX);
        assert!(tx.input[0].script_sig.is_empty());
        assert!(tx.input[0].witness.is_empty());
    }

    #[test]
    fn serialization_is_deterministic() {
        let utxos = vec![
            make_test_utxo('a', 0, 100_000),
            make_test_utxo('e', 3, 50_000),
        ];
        let first = DraftTransaction::build(&utxos, &spend(), vec![pay(80_000), change(69_000)])
            .unwrap();
        let second = DraftTransaction::build(&utxos, &spend(), vec![pay(80_000), change(69_000)])
            .unwrap();
        assert_eq!(first.serialize(), second.serialize());
        assert_eq!(first.serialize_hex(), second.serialize_hex());
    }

    #[test]
    fn serialized_form_is_a_psbt() {
        let utxos = vec![make_test_utxo('a', 0, 100_000)];
        let draft = DraftTransaction::build(&utxos, &spend(), vec![pay(80_000)]).unwrap();
        let bytes = draft.serialize();
        assert_eq!(&bytes[..5], b"psbt\xff");
        assert_eq!(draft.size_in_bytes(), bytes.len() as u64);
        assert_eq!(draft.serialize_hex(), hex::encode(&bytes));

        let decoded = Psbt::deserialize(&bytes).unwrap();
        assert_eq!(&decoded, draft.psbt());
    }

    #[test]
    fn extra_output_grows_size() {
        let utxos = vec![make_test_utxo('a', 0, 100_000)];
        let one = DraftTransaction::build(&utxos, &spend(), vec![pay(80_000)]).unwrap();
        let two = DraftTransaction::build(&utxos, &spend(), vec![pay(80_000), change(0)])
            .unwrap();
        assert!(two.size_in_bytes() > one.size_in_bytes());
    }

    #[test]
    fn zero_value_placeholder_output_is_allowed() {
        let utxos = vec![make_test_utxo('a', 0, 80_000)];
        let draft = DraftTransaction::build(&utxos, &spend(), vec![pay(80_000), change(0)])
            .unwrap();
        assert_eq!(draft.outputs().len(), 2);
        assert_eq!(draft.fee_sat(), 0);
    }

    #[test]
    fn outputs_exceeding_inputs_are_rejected() {
        let utxos = vec![make_test_utxo('a', 0, 10_000)];
        let err = DraftTransaction::build(&utxos, &spend(), vec![pay(10_001)]).unwrap_err();
        assert!(err.to_string().contains("exceed inputs"));
    }

    #[test]
    fn empty_inputs_are_rejected() {
        let err = DraftTransaction::build(&[], &spend(), vec![pay(1)]).unwrap_err();
        assert!(matches!(err, BtcError::TransactionBuildError(_)));
    }

    #[test]
    fn malformed_txid_is_rejected() {
        let utxos = vec![Utxo::new("not-a-txid", 0, 10_000)];
        let err = DraftTransaction::build(&utxos, &spend(), vec![pay(1_000)]).unwrap_err();
        assert!(err.to_string().contains("invalid txid"));
    }
}
