use bitcoin::address::{Address, NetworkUnchecked};
use bitcoin::key::XOnlyPublicKey;
use bitcoin::script::ScriptBuf;
use bitcoin::secp256k1::Secp256k1;

use crate::error::BtcError;
use crate::network::BtcNetwork;

/// Key-path Taproot spend data for the wallet's own outputs.
///
/// Every input the wallet funds carries this script as its `witness_utxo`
/// script and the key as its `tap_internal_key`, which is all the signing
/// provider needs to produce a key-path signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaprootSpend {
    /// 32-byte x-only internal key.
    pub internal_key: XOnlyPublicKey,
    /// P2TR locking script (`OP_1 <tweaked key>`).
    pub script_pubkey: ScriptBuf,
}

impl TaprootSpend {
    /// Derive the spend data from the hex public key handed out by the
    /// signing provider.
    ///
    /// The first byte (the SEC parity prefix) is dropped and the next 32 bytes
    /// are taken as the x-only key.
    pub fn from_public_key_hex(public_key_hex: &str) -> Result<Self, BtcError> {
        let bytes = hex::decode(public_key_hex)
            .map_err(|e| BtcError::NoSpendScript(format!("public key is not hex: {e}")))?;
        if bytes.len() < 33 {
            return Err(BtcError::NoSpendScript(format!(
                "public key must be at least 33 bytes, got {}",
                bytes.len()
            )));
        }

        let internal_key = XOnlyPublicKey::from_slice(&bytes[1..33])
            .map_err(|e| BtcError::NoSpendScript(format!("invalid x-only key: {e}")))?;

        let secp = Secp256k1::verification_only();
        let script_pubkey = ScriptBuf::new_p2tr(&secp, internal_key, None);

        Ok(Self {
            internal_key,
            script_pubkey,
        })
    }

    /// The bech32m address that pays to this spend script.
    pub fn address(&self, network: BtcNetwork) -> Address {
        let secp = Secp256k1::verification_only();
        Address::p2tr(&secp, self.internal_key, None, network.to_bitcoin_network())
    }
}

/// Parse an address string and require that it belongs to `network`.
pub fn parse_address(address: &str, network: BtcNetwork) -> Result<Address, BtcError> {
    address
        .parse::<Address<NetworkUnchecked>>()
        .map_err(|e| BtcError::InvalidAddress(format!("failed to parse address: {e}")))?
        .require_network(network.to_bitcoin_network())
        .map_err(|e| BtcError::InvalidAddress(format!("address wrong network: {e}")))
}
