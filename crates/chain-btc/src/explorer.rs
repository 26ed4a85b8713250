//! Block-explorer links for transactions and addresses.

use crate::network::BtcNetwork;

/// Default explorer host.
pub const DEFAULT_EXPLORER_URL: &str = "https://mempool.space";

/// `{base}/{network segment}tx/{txid}`. The segment is empty on mainnet.
pub fn transaction_url(base_url: &str, txid: &str, network: BtcNetwork) -> String {
    format!(
        "{}/{}tx/{}",
        base_url.trim_end_matches('/'),
        network.path_segment(),
        txid
    )
}

/// `{base}/{network segment}address/{address}`.
pub fn address_url(base_url: &str, address: &str, network: BtcNetwork) -> String {
    format!(
        "{}/{}address/{}",
        base_url.trim_end_matches('/'),
        network.path_segment(),
        address
    )
}
