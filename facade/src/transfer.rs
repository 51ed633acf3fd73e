//! Transaction Sender view: sender choices with balances, and submission.
//!
//! Submitting never refreshes a collection. The ledger's acknowledgement is
//! reported as a notice; balances change on the next load.

use std::sync::Arc;

use aztecs_client::{ClientError, LedgerClient, SubmitReceipt};
use aztecs_types::TransactionRequest;
use tokio::sync::watch;

use crate::balances::BalanceAggregator;
use crate::config::FacadeConfig;
use crate::controller::{MutationController, MutationOutcome, Phase};
use crate::view::{Notice, ViewCell, ViewState};
use crate::view_model::WalletRow;
use crate::wallets::fetch_wallet_rows;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SenderMeta {
    /// The intent being submitted, or the last one that failed. Cleared once
    /// the ledger accepts it.
    pub draft: Option<TransactionRequest>,
    pub last_receipt: Option<SubmitReceipt>,
}

pub type TransactionSenderState = ViewState<WalletRow, SenderMeta>;

pub struct TransactionSender<C> {
    client: Arc<C>,
    aggregator: BalanceAggregator,
    cell: ViewCell<WalletRow, SenderMeta>,
    submission: MutationController,
}

impl<C: LedgerClient> TransactionSender<C> {
    pub fn new(client: Arc<C>, config: &FacadeConfig) -> Self {
        Self {
            client,
            aggregator: config.aggregator(),
            cell: ViewCell::new(SenderMeta::default()),
            submission: MutationController::new("submit_transaction", config.refresh_retries),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionSenderState> {
        self.cell.subscribe()
    }

    pub fn state(&self) -> TransactionSenderState {
        self.cell.current()
    }

    /// Busy indicator of the submit action.
    pub fn submitting(&self) -> watch::Receiver<Phase> {
        self.submission.subscribe()
    }

    /// Load the wallets a transfer can be sent from.
    pub async fn load_wallets(&self) -> Result<(), ClientError> {
        let fetch = self.cell.begin_fetch();
        let ticket = fetch.ticket();
        match fetch_wallet_rows(self.client.as_ref(), &self.aggregator).await {
            Ok(rows) => {
                tracing::debug!(ticket, count = rows.len(), "sender wallets fetched");
                fetch.apply(rows);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(ticket, error = %e, "sender wallet fetch failed");
                fetch.fail(Notice::Error(format!("Could not load wallets: {e}")));
                Err(e)
            }
        }
    }

    /// Validate a transfer locally and submit it.
    ///
    /// An intent with a missing address or a non-positive amount fails with
    /// [`ClientError::InvalidRequest`] before anything is sent.
    pub async fn submit(&self, from: &str, to: &str, amount: f64) -> MutationOutcome<SubmitReceipt> {
        let request = match TransactionRequest::new(from, to, amount) {
            Ok(request) => request,
            Err(e) => {
                let error = ClientError::from(e);
                tracing::debug!(error = %error, "transfer refused before submission");
                self.cell.set_notice(Notice::Error(error.to_string()));
                return MutationOutcome::Failed(error);
            }
        };

        let outcome = self
            .submission
            .run_without_refresh(|| {
                let draft = request.clone();
                self.cell.update_meta(|meta| meta.draft = Some(draft));
                self.client.submit_transaction(&request)
            })
            .await;

        match &outcome {
            MutationOutcome::Succeeded { value, .. } => {
                let message = value
                    .message
                    .clone()
                    .unwrap_or_else(|| "Transaction submitted".to_string());
                let receipt = value.clone();
                self.cell.update_meta(|meta| {
                    meta.draft = None;
                    meta.last_receipt = Some(receipt);
                });
                self.cell.set_notice(Notice::Success(message));
            }
            MutationOutcome::Failed(e) => self
                .cell
                .set_notice(Notice::Error(format!("Transaction failed: {e}"))),
            MutationOutcome::Coalesced => {}
        }
        outcome
    }
}
