//! Block Explorer view: the chain in service order, and mining.

use std::sync::Arc;

use aztecs_client::{ClientError, LedgerClient, MineReceipt};
use tokio::sync::watch;
use tracing::Instrument;

use crate::config::FacadeConfig;
use crate::controller::{MutationController, MutationOutcome, Phase, RefreshOutcome};
use crate::spans;
use crate::view::{Notice, ViewCell, ViewState};
use crate::view_model::{normalize_blocks, BlockRow, TimestampRenderer};
use crate::FacadeError;

pub type BlockExplorerState = ViewState<BlockRow>;

pub struct BlockExplorer<C> {
    client: Arc<C>,
    cell: ViewCell<BlockRow>,
    mining: MutationController,
    renderer: TimestampRenderer,
}

impl<C: LedgerClient> BlockExplorer<C> {
    pub fn new(client: Arc<C>, config: &FacadeConfig) -> Result<Self, FacadeError> {
        Ok(Self {
            client,
            cell: ViewCell::new(()),
            mining: MutationController::new("mine", config.refresh_retries),
            renderer: TimestampRenderer::from_config(&config.timestamp)?,
        })
    }

    /// Render block times with `renderer` instead of the configured one.
    pub fn with_renderer(mut self, renderer: TimestampRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<BlockExplorerState> {
        self.cell.subscribe()
    }

    pub fn state(&self) -> BlockExplorerState {
        self.cell.current()
    }

    /// Busy indicator of the mine action.
    pub fn mining(&self) -> watch::Receiver<Phase> {
        self.mining.subscribe()
    }

    /// Fetch the chain and replace the displayed rows with it.
    pub async fn load(&self) -> Result<(), ClientError> {
        self.fetch().instrument(spans::ledger_call("list_blocks")).await
    }

    /// Mine one block, then refetch the chain.
    pub async fn mine(&self) -> MutationOutcome<MineReceipt> {
        let outcome = self
            .mining
            .run(|| self.client.mine(), || self.fetch())
            .await;

        match &outcome {
            MutationOutcome::Succeeded { value, refresh } => {
                let mined = match value.block.as_ref() {
                    Some(block) => format!("Block #{} mined", block.index),
                    None => "Block mined".to_string(),
                };
                match refresh {
                    RefreshOutcome::Stale { error, .. } => self.cell.mark_stale(Notice::Warning(
                        format!("{mined}, but the chain could not be refreshed: {error}"),
                    )),
                    _ => self.cell.set_notice(Notice::Success(mined)),
                }
            }
            MutationOutcome::Failed(e) => {
                self.cell.set_notice(Notice::Error(format!("Mining failed: {e}")))
            }
            MutationOutcome::Coalesced => {}
        }
        outcome
    }

    async fn fetch(&self) -> Result<(), ClientError> {
        let fetch = self.cell.begin_fetch();
        let ticket = fetch.ticket();
        match self.client.list_blocks().await {
            Ok(blocks) => {
                let rows = normalize_blocks(blocks, &self.renderer);
                tracing::debug!(ticket, count = rows.len(), "chain fetched");
                fetch.apply(rows);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(ticket, error = %e, "chain fetch failed");
                fetch.fail(Notice::Error(format!("Could not load blocks: {e}")));
                Err(e)
            }
        }
    }
}
