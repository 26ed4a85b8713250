use chain_btc::fee::Recipient;
use serde::{Deserialize, Serialize};

/// Address handed out by the signing provider, fetched once per reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAddress {
    pub address: String,
    pub derivation_path: String,
    pub index: u32,
    /// Hex public key. Its first byte is dropped to get the x-only key.
    pub public_key: String,
}

/// Response of the signing provider: a signed transaction, opaque to us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub signed_hex: String,
}

/// Notifications pushed by the signing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    AccountChanged,
}

/// A user's send form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub address: String,
    pub amount_sat: u64,
    /// Falls back to the recommended rate from the last reload.
    #[serde(default)]
    pub fee_rate_sat_vbyte: Option<u64>,
}

impl SendRequest {
    pub fn recipient(&self) -> Recipient {
        Recipient {
            address: self.address.clone(),
            amount_sat: self.amount_sat,
        }
    }
}

/// Outcome of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub txid: String,
    pub fee_sat: u64,
    pub change_sat: Option<u64>,
    pub explorer_url: String,
}
