//! Mutation-then-Refresh Controller.
//!
//! Each mutating action (mine, create wallet, send transaction) owns one
//! controller with two phases, `Idle` and `Pending`:
//!
//! - A trigger moves `Idle -> Pending`. A trigger that finds the controller
//!   `Pending` is coalesced: it issues nothing and returns
//!   [`MutationOutcome::Coalesced`].
//! - Once the mutating call settles successfully, the view's refresh runs,
//!   strictly afterwards and never alongside it. A failed refresh is retried
//!   up to `refresh_retries` times, then reported as
//!   [`RefreshOutcome::Stale`]; the mutation still counts as a success.
//! - A failed mutating call is terminal for that attempt: no refresh, no
//!   retry.
//! - The controller returns to `Idle` when the attempt is over, including
//!   when the future is dropped part-way.
//!
//! The phase is published through a `watch` channel so a presentation layer
//! can drive its busy indicator from it.

use std::future::Future;

use aztecs_client::ClientError;
use tokio::sync::watch;
use tracing::Instrument;

use crate::spans;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
}

/// What happened to the refresh that follows a successful mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshOutcome {
    /// The action has no collection to refresh.
    NotRequired,
    Fresh { attempts: u32 },
    /// Every attempt failed; the view keeps its previous collection.
    Stale { error: ClientError, attempts: u32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome<T> {
    /// Another attempt was already pending; nothing was sent.
    Coalesced,
    Failed(ClientError),
    Succeeded { value: T, refresh: RefreshOutcome },
}

impl<T> MutationOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationOutcome::Succeeded { .. })
    }
}

/// Returns the controller to `Idle` when dropped.
pub struct PendingGuard<'a> {
    phase: &'a watch::Sender<Phase>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(Phase::Idle);
    }
}

pub struct MutationController {
    action: &'static str,
    phase: watch::Sender<Phase>,
    refresh_retries: u32,
}

impl MutationController {
    pub fn new(action: &'static str, refresh_retries: u32) -> Self {
        let (phase, _) = watch::channel(Phase::Idle);
        Self {
            action,
            phase,
            refresh_retries,
        }
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    /// Move `Idle -> Pending`, or return `None` if already pending. The
    /// check and the transition happen under the channel's lock.
    pub fn try_begin(&self) -> Option<PendingGuard<'_>> {
        let acquired = self.phase.send_if_modified(|phase| {
            if *phase == Phase::Idle {
                *phase = Phase::Pending;
                true
            } else {
                false
            }
        });
        acquired.then_some(PendingGuard { phase: &self.phase })
    }

    /// Run a mutation, then `refresh` once it has succeeded.
    pub async fn run<T, M, MF, R, RF>(&self, mutate: M, mut refresh: R) -> MutationOutcome<T>
    where
        M: FnOnce() -> MF,
        MF: Future<Output = Result<T, ClientError>>,
        R: FnMut() -> RF,
        RF: Future<Output = Result<(), ClientError>>,
    {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!(action = self.action, "mutation already pending; trigger coalesced");
            return MutationOutcome::Coalesced;
        };

        async {
            let value = match self.mutate(mutate).await {
                Ok(value) => value,
                Err(e) => return MutationOutcome::Failed(e),
            };
            let refresh = self.refresh(&mut refresh).await;
            MutationOutcome::Succeeded { value, refresh }
        }
        .instrument(spans::mutation(self.action))
        .await
    }

    /// Run a mutation that has no collection to refresh afterwards.
    pub async fn run_without_refresh<T, M, MF>(&self, mutate: M) -> MutationOutcome<T>
    where
        M: FnOnce() -> MF,
        MF: Future<Output = Result<T, ClientError>>,
    {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!(action = self.action, "mutation already pending; trigger coalesced");
            return MutationOutcome::Coalesced;
        };

        async {
            match self.mutate(mutate).await {
                Ok(value) => MutationOutcome::Succeeded {
                    value,
                    refresh: RefreshOutcome::NotRequired,
                },
                Err(e) => MutationOutcome::Failed(e),
            }
        }
        .instrument(spans::mutation(self.action))
        .await
    }

    async fn mutate<T, M, MF>(&self, mutate: M) -> Result<T, ClientError>
    where
        M: FnOnce() -> MF,
        MF: Future<Output = Result<T, ClientError>>,
    {
        let result = mutate().instrument(spans::ledger_call(self.action)).await;
        match &result {
            Ok(_) => tracing::info!(action = self.action, "mutation accepted"),
            Err(e) => tracing::warn!(action = self.action, error = %e, "mutation failed"),
        }
        result
    }

    async fn refresh<R, RF>(&self, refresh: &mut R) -> RefreshOutcome
    where
        R: FnMut() -> RF,
        RF: Future<Output = Result<(), ClientError>>,
    {
        let allowed = self.refresh_retries.saturating_add(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match refresh().instrument(spans::refresh(self.action, attempt)).await {
                Ok(()) => return RefreshOutcome::Fresh { attempts: attempt },
                Err(e) if attempt < allowed => {
                    tracing::warn!(action = self.action, attempt, error = %e, "refresh failed; retrying");
                }
                Err(e) => {
                    tracing::warn!(action = self.action, attempt, error = %e, "refresh failed; view may be stale");
                    return RefreshOutcome::Stale { error: e, attempts: attempt };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aztecs_client::LedgerClient;
    use aztecs_nullables::{JournalEntry, LedgerCall, NullLedger, Operation};
    use std::time::Duration;

    async fn refetch(ledger: &NullLedger) -> Result<(), ClientError> {
        ledger.list_blocks().await.map(|_| ())
    }

    #[tokio::test]
    async fn success_refreshes_once_after_settlement() {
        let ledger = NullLedger::new();
        let controller = MutationController::new("mine", 1);

        let outcome = controller
            .run(|| ledger.mine(), || refetch(&ledger))
            .await;

        assert!(outcome.is_success());
        assert_eq!(ledger.count(Operation::ListBlocks), 1);
        let journal = ledger.journal();
        let mine_settled = journal
            .iter()
            .position(|e| *e == JournalEntry::Settled { call: LedgerCall::Mine, ok: true })
            .unwrap();
        let refetch_issued = journal
            .iter()
            .position(|e| *e == JournalEntry::Issued(LedgerCall::ListBlocks))
            .unwrap();
        assert!(mine_settled < refetch_issued);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn failure_skips_refresh() {
        let ledger = NullLedger::new();
        ledger.fail_next(Operation::Mine, ClientError::ServiceUnavailable("down".into()));
        let controller = MutationController::new("mine", 1);

        let outcome = controller
            .run(|| ledger.mine(), || refetch(&ledger))
            .await;

        assert!(matches!(outcome, MutationOutcome::Failed(ClientError::ServiceUnavailable(_))));
        assert_eq!(ledger.count(Operation::ListBlocks), 0);
        assert_eq!(controller.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn overlapping_trigger_is_coalesced() {
        let ledger = NullLedger::new();
        ledger.hold(Operation::Mine);
        let controller = MutationController::new("mine", 0);

        let first = controller.run(|| ledger.mine(), || refetch(&ledger));
        let second = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            assert_eq!(controller.phase(), Phase::Pending);
            let outcome = controller.run(|| ledger.mine(), || refetch(&ledger)).await;
            ledger.release(Operation::Mine);
            outcome
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_success());
        assert_eq!(second, MutationOutcome::Coalesced);
        assert_eq!(ledger.count(Operation::Mine), 1);
        assert_eq!(ledger.count(Operation::ListBlocks), 1);
    }

    #[tokio::test]
    async fn failed_refresh_is_retried_then_reported_stale() {
        let ledger = NullLedger::new();
        ledger.fail_always(Operation::ListBlocks, ClientError::ServiceUnavailable("down".into()));
        let controller = MutationController::new("mine", 1);

        let outcome = controller
            .run(|| ledger.mine(), || refetch(&ledger))
            .await;

        match outcome {
            MutationOutcome::Succeeded { refresh, .. } => assert_eq!(
                refresh,
                RefreshOutcome::Stale {
                    error: ClientError::ServiceUnavailable("down".into()),
                    attempts: 2
                }
            ),
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(ledger.count(Operation::ListBlocks), 2);
    }

    #[tokio::test]
    async fn retry_recovers_a_flaky_refresh() {
        let ledger = NullLedger::new();
        ledger.fail_next(Operation::ListBlocks, ClientError::Decode("truncated".into()));
        let controller = MutationController::new("mine", 1);

        let outcome = controller
            .run(|| ledger.mine(), || refetch(&ledger))
            .await;
        match outcome {
            MutationOutcome::Succeeded { refresh, .. } => {
                assert_eq!(refresh, RefreshOutcome::Fresh { attempts: 2 })
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn phase_is_published() {
        let ledger = NullLedger::new();
        let controller = MutationController::new("submit", 0);
        let mut phases = controller.subscribe();
        ledger.hold(Operation::Mine);

        let run = controller.run_without_refresh(|| ledger.mine());
        let observe = async {
            phases.changed().await.unwrap();
            assert_eq!(*phases.borrow_and_update(), Phase::Pending);
            ledger.release(Operation::Mine);
            phases.changed().await.unwrap();
            assert_eq!(*phases.borrow_and_update(), Phase::Idle);
        };
        let (outcome, ()) = tokio::join!(run, observe);
        match outcome {
            MutationOutcome::Succeeded { refresh, .. } => assert_eq!(refresh, RefreshOutcome::NotRequired),
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_attempt_returns_to_idle() {
        let ledger = NullLedger::new();
        ledger.hold(Operation::Mine);
        let controller = MutationController::new("mine", 0);

        let attempt = controller.run_without_refresh(|| ledger.mine());
        let timed_out = tokio::time::timeout(Duration::from_millis(20), attempt).await;
        assert!(timed_out.is_err());
        assert_eq!(controller.phase(), Phase::Idle);
    }
}
