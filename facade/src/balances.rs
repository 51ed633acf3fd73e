//! Balance Aggregator: one balance per wallet, fetched concurrently.
//!
//! Every address gets its own `get_balance` request. The requests run side
//! by side (fan-out) and the aggregate completes only once each of them has
//! settled (join-all, not a race). Output order is input order regardless
//! of the order in which responses arrive. A failing address only spoils
//! its own slot; the aggregate itself cannot fail.

use std::fmt;
use std::num::NonZeroUsize;

use aztecs_client::{ClientError, LedgerClient};
use aztecs_types::{Amount, WalletAddress};
use futures_util::stream::{self, StreamExt};
use tracing::Instrument;

use crate::spans;

/// Balance of one wallet, or the reason it is unavailable.
#[derive(Clone, Debug, PartialEq)]
pub enum BalanceStatus {
    Available(Amount),
    Unavailable(ClientError),
}

impl BalanceStatus {
    pub fn amount(&self) -> Option<Amount> {
        match self {
            BalanceStatus::Available(amount) => Some(*amount),
            BalanceStatus::Unavailable(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BalanceStatus::Unavailable(_))
    }
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStatus::Available(amount) => write!(f, "{amount}"),
            BalanceStatus::Unavailable(_) => write!(f, "Error"),
        }
    }
}

/// One slot of an aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct WalletBalance {
    pub address: WalletAddress,
    pub balance: BalanceStatus,
}

/// Fans balance lookups out over a ledger client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalanceAggregator {
    /// `None`: every request is issued at once.
    limit: Option<NonZeroUsize>,
}

impl BalanceAggregator {
    /// Issue one request per address, all outstanding simultaneously.
    pub fn unbounded() -> Self {
        Self { limit: None }
    }

    /// Keep at most `limit` requests outstanding at a time.
    pub fn bounded(limit: NonZeroUsize) -> Self {
        Self { limit: Some(limit) }
    }

    pub fn limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }

    /// Fetch the balance of every address and return one entry per address,
    /// in input order.
    pub async fn collect<C: LedgerClient>(
        &self,
        client: &C,
        addresses: Vec<WalletAddress>,
    ) -> Vec<WalletBalance> {
        let width = self
            .limit
            .map_or(addresses.len(), NonZeroUsize::get)
            .max(1);
        let total = addresses.len();

        let entries: Vec<WalletBalance> = stream::iter(addresses)
            .map(|address| async move {
                let span = spans::balance_fetch(&address);
                let balance = match client.get_balance(&address).instrument(span).await {
                    Ok(amount) => BalanceStatus::Available(amount),
                    Err(e) => {
                        tracing::warn!(address = %address, error = %e, "balance unavailable");
                        BalanceStatus::Unavailable(e)
                    }
                };
                WalletBalance { address, balance }
            })
            .buffered(width)
            .collect()
            .await;

        let failed = entries.iter().filter(|e| e.balance.is_error()).count();
        tracing::debug!(total, failed, width, "balances aggregated");
        entries
    }
}
