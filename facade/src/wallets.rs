//! Wallet Manager view: every wallet with its balance, and wallet creation.

use std::sync::Arc;

use aztecs_client::{ClientError, LedgerClient};
use aztecs_types::WalletAddress;
use tokio::sync::watch;
use tracing::Instrument;

use crate::balances::BalanceAggregator;
use crate::config::FacadeConfig;
use crate::controller::{MutationController, MutationOutcome, Phase, RefreshOutcome};
use crate::spans;
use crate::view::{Notice, ViewCell, ViewState};
use crate::view_model::{normalize_wallets, WalletRow};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WalletMeta {
    /// Address of the last wallet created from this view. Set only once the
    /// refreshed list containing it is on display.
    pub last_created: Option<WalletAddress>,
}

pub type WalletManagerState = ViewState<WalletRow, WalletMeta>;

pub struct WalletManager<C> {
    client: Arc<C>,
    aggregator: BalanceAggregator,
    cell: ViewCell<WalletRow, WalletMeta>,
    creation: MutationController,
}

/// List every address, then aggregate their balances into display rows.
pub(crate) async fn fetch_wallet_rows<C: LedgerClient>(
    client: &C,
    aggregator: &BalanceAggregator,
) -> Result<Vec<WalletRow>, ClientError> {
    let addresses = client
        .list_wallet_addresses()
        .instrument(spans::ledger_call("list_wallets"))
        .await?;
    let balances = aggregator.collect(client, addresses).await;
    Ok(normalize_wallets(balances))
}

impl<C: LedgerClient> WalletManager<C> {
    pub fn new(client: Arc<C>, config: &FacadeConfig) -> Self {
        Self {
            client,
            aggregator: config.aggregator(),
            cell: ViewCell::new(WalletMeta::default()),
            creation: MutationController::new("create_wallet", config.refresh_retries),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletManagerState> {
        self.cell.subscribe()
    }

    pub fn state(&self) -> WalletManagerState {
        self.cell.current()
    }

    /// Busy indicator of the create-wallet action.
    pub fn creating(&self) -> watch::Receiver<Phase> {
        self.creation.subscribe()
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        self.fetch().await
    }

    /// Create a wallet, then refetch the wallet list and every balance.
    pub async fn create_wallet(&self) -> MutationOutcome<WalletAddress> {
        let outcome = self
            .creation
            .run(|| self.client.create_wallet(), || self.fetch())
            .await;

        match &outcome {
            MutationOutcome::Succeeded { value, refresh } => match refresh {
                RefreshOutcome::Stale { error, .. } => self.cell.mark_stale(Notice::Warning(
                    format!("Wallet {value} created, but the list could not be refreshed: {error}"),
                )),
                _ => {
                    let address = value.clone();
                    self.cell.update_meta(|meta| meta.last_created = Some(address));
                    self.cell
                        .set_notice(Notice::Success(format!("Wallet {value} created")));
                }
            },
            MutationOutcome::Failed(e) => self
                .cell
                .set_notice(Notice::Error(format!("Wallet creation failed: {e}"))),
            MutationOutcome::Coalesced => {}
        }
        outcome
    }

    async fn fetch(&self) -> Result<(), ClientError> {
        let fetch = self.cell.begin_fetch();
        let ticket = fetch.ticket();
        match fetch_wallet_rows(self.client.as_ref(), &self.aggregator).await {
            Ok(rows) => {
                let failed = rows.iter().filter(|r| r.balance.is_error()).count();
                tracing::debug!(ticket, count = rows.len(), failed, "wallets fetched");
                fetch.apply(rows);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(ticket, error = %e, "wallet list fetch failed");
                fetch.fail(Notice::Error(format!("Could not load wallets: {e}")));
                Err(e)
            }
        }
    }
}
