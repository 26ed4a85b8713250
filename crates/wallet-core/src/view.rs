//! Display-ready projections of [`WalletState`].

use chain_btc::explorer;
use chain_btc::history::{self, Direction, HistoricalTx, WalletSummary};
use chain_btc::network::BtcNetwork;
use chain_btc::utxo;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::session::WalletState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletStats {
    pub balance_sat: u64,
    pub utxo_count: usize,
    pub summary: WalletSummary,
}

impl WalletStats {
    pub fn from_state(state: &WalletState) -> Self {
        Self {
            balance_sat: state.balance(),
            utxo_count: state.utxos.len(),
            summary: state.summary(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    pub txid: String,
    pub short_txid: String,
    pub direction: Direction,
    pub net_sat: u64,
    /// `"unconfirmed"` or a relative time such as `"5 minutes ago"`.
    pub when: String,
    pub explorer_url: String,
}

impl HistoryRow {
    /// `+` for incoming, `-` for outgoing.
    pub fn sign(&self) -> char {
        match self.direction {
            Direction::Incoming => '+',
            Direction::Outgoing => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UtxoRow {
    pub txid: String,
    pub vout: u32,
    pub amount_sat: u64,
    pub explorer_url: String,
}

/// `first8...last8`. Strings of 16 characters or fewer are returned as is.
pub fn short_txid(txid: &str) -> String {
    if txid.len() <= 16 || !txid.is_ascii() {
        return txid.to_string();
    }
    format!("{}...{}", &txid[..8], &txid[txid.len() - 8..])
}

pub fn history_rows(
    state: &WalletState,
    explorer_base: &str,
    now: DateTime<Utc>,
) -> Vec<HistoryRow> {
    state
        .transactions
        .iter()
        .map(|tx| history_row(tx, &state.address.address, state.network, explorer_base, now))
        .collect()
}

fn history_row(
    tx: &HistoricalTx,
    wallet_address: &str,
    network: BtcNetwork,
    explorer_base: &str,
    now: DateTime<Utc>,
) -> HistoryRow {
    let classification = history::classify(tx, wallet_address);
    let when = match (tx.status.confirmed, tx.status.block_time) {
        (true, Some(block_time)) => match DateTime::from_timestamp(block_time as i64, 0) {
            Some(at) => relative_time(at, now),
            None => "unknown".to_string(),
        },
        _ => "unconfirmed".to_string(),
    };

    HistoryRow {
        short_txid: short_txid(&tx.txid),
        direction: classification.direction,
        net_sat: classification.net_sat,
        when,
        explorer_url: explorer::transaction_url(explorer_base, &tx.txid, network),
        txid: tx.txid.clone(),
    }
}

/// UTXOs largest first, each linked to the transaction that created it.
pub fn utxo_rows(state: &WalletState, explorer_base: &str) -> Vec<UtxoRow> {
    utxo::sorted_by_value_desc(&state.utxos)
        .into_iter()
        .map(|u| UtxoRow {
            explorer_url: explorer::transaction_url(explorer_base, &u.txid, state.network),
            txid: u.txid.clone(),
            vout: u.vout,
            amount_sat: u.amount_sat,
        })
        .collect()
}

/// Humanized distance between `at` and `now`, e.g. `"about 3 hours ago"`
/// or `"in 2 days"`.
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    let distance = humanize_minutes((seconds.unsigned_abs() + 30) / 60);
    if seconds >= 0 {
        format!("{distance} ago")
    } else {
        format!("in {distance}")
    }
}

fn humanize_minutes(minutes: u64) -> String {
    const HOUR: u64 = 60;
    const DAY: u64 = 24 * HOUR;
    const MONTH: u64 = 30 * DAY;
    const YEAR: u64 = 365 * DAY;

    fn plural(n: u64, unit: &str) -> String {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    }

    match minutes {
        0 => "less than a minute".to_string(),
        m if m < 45 => plural(m, "minute"),
        m if m < 90 => "about 1 hour".to_string(),
        m if m < DAY => format!("about {}", plural(div_round(m, HOUR), "hour")),
        m if m < 42 * HOUR => "1 day".to_string(),
        m if m < MONTH => plural(div_round(m, DAY), "day"),
        m if m < 2 * MONTH => format!("about {}", plural(div_round(m, MONTH), "month")),
        m if m < YEAR => plural(div_round(m, MONTH), "month"),
        m => format!("about {}", plural(div_round(m, YEAR), "year")),
    }
}

fn div_round(n: u64, d: u64) -> u64 {
    (n + d / 2) / d
}
