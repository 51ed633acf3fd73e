//! Nullable ledger: an in-memory ledger service.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use aztecs_client::{ClientError, LedgerClient, MineReceipt, SubmitReceipt};
use aztecs_types::{Amount, Block, BlockData, TransactionRequest, WalletAddress};

use crate::{Gate, JournalEntry, LedgerCall, Operation};

#[derive(Default)]
struct Chain {
    blocks: Vec<Block>,
    wallets: Vec<(WalletAddress, Amount)>,
    created: usize,
}

#[derive(Default)]
struct Script {
    /// One-shot failures, consumed in order.
    next: HashMap<Operation, VecDeque<ClientError>>,
    /// Failures returned until cleared.
    always: HashMap<Operation, ClientError>,
    /// Per-address balance failures.
    balances: HashMap<WalletAddress, ClientError>,
    /// Per-address balance latency.
    balance_delays: HashMap<WalletAddress, Duration>,
}

/// An in-memory ledger that behaves like the real service at its API
/// boundary. Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    chain: Mutex<Chain>,
    script: Mutex<Script>,
    journal: Mutex<Vec<JournalEntry>>,
    gates: HashMap<Operation, Gate>,
    balance_in_flight: AtomicUsize,
    balance_peak: AtomicUsize,
}

impl NullLedger {
    /// A ledger holding only a genesis block and no wallets.
    pub fn new() -> Self {
        let ledger = Self {
            chain: Mutex::new(Chain::default()),
            script: Mutex::new(Script::default()),
            journal: Mutex::new(Vec::new()),
            gates: Operation::ALL.iter().map(|op| (*op, Gate::new())).collect(),
            balance_in_flight: AtomicUsize::new(0),
            balance_peak: AtomicUsize::new(0),
        };
        ledger.push_block();
        ledger
    }

    /// Replace the chain with the given blocks, in the given order.
    pub fn with_blocks(self, blocks: Vec<Block>) -> Self {
        self.chain.lock().unwrap().blocks = blocks;
        self
    }

    /// Add a wallet with a starting balance.
    pub fn with_wallet(self, address: &str, balance: f64) -> Self {
        let amount = Amount::new(balance).unwrap_or(Amount::ZERO);
        self.chain
            .lock()
            .unwrap()
            .wallets
            .push((WalletAddress::new(address), amount));
        self
    }

    // ── Scripting ───────────────────────────────────────────────────────

    /// Fail the next call of `op` with `error`. Queued failures are used up
    /// in order before calls succeed again.
    pub fn fail_next(&self, op: Operation, error: ClientError) {
        self.script
            .lock()
            .unwrap()
            .next
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Fail every call of `op` until [`NullLedger::recover`].
    pub fn fail_always(&self, op: Operation, error: ClientError) {
        self.script.lock().unwrap().always.insert(op, error);
    }

    /// Clear every scripted failure for `op`.
    pub fn recover(&self, op: Operation) {
        let mut script = self.script.lock().unwrap();
        script.next.remove(&op);
        script.always.remove(&op);
    }

    /// Fail balance lookups for one address.
    pub fn fail_balance(&self, address: &str, error: ClientError) {
        self.script
            .lock()
            .unwrap()
            .balances
            .insert(WalletAddress::new(address), error);
    }

    /// Delay balance lookups for one address.
    pub fn delay_balance(&self, address: &str, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .balance_delays
            .insert(WalletAddress::new(address), delay);
    }

    /// Park calls of `op` after they are issued, until [`NullLedger::release`].
    pub fn hold(&self, op: Operation) {
        self.gates[&op].close();
    }

    pub fn release(&self, op: Operation) {
        self.gates[&op].open();
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// Every call issued so far, in issue order.
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter_map(|entry| match entry {
                JournalEntry::Issued(call) => Some(call.clone()),
                JournalEntry::Settled { .. } => None,
            })
            .collect()
    }

    /// Number of calls of `op` issued so far.
    pub fn count(&self, op: Operation) -> usize {
        self.calls().iter().filter(|c| c.operation() == op).count()
    }

    /// Issue and settle events, interleaved as they happened.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.lock().unwrap().clone()
    }

    /// Highest number of balance lookups that were outstanding at once.
    pub fn peak_concurrent_balances(&self) -> usize {
        self.balance_peak.load(Ordering::SeqCst)
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.chain.lock().unwrap().blocks.clone()
    }

    pub fn balance_of(&self, address: &str) -> Option<Amount> {
        self.chain
            .lock()
            .unwrap()
            .wallets
            .iter()
            .find(|(a, _)| a.as_str() == address)
            .map(|(_, amount)| *amount)
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn issue(&self, call: &LedgerCall) {
        self.journal
            .lock()
            .unwrap()
            .push(JournalEntry::Issued(call.clone()));
    }

    fn settle<T>(&self, call: LedgerCall, result: Result<T, ClientError>) -> Result<T, ClientError> {
        self.journal.lock().unwrap().push(JournalEntry::Settled {
            call,
            ok: result.is_ok(),
        });
        result
    }

    /// Record the call, apply any scripted latency, wait at its gate, then
    /// return a scripted failure if one applies.
    async fn enter(&self, call: &LedgerCall) -> Result<(), ClientError> {
        self.issue(call);
        if let LedgerCall::GetBalance(address) = call {
            let delay = self.script.lock().unwrap().balance_delays.get(address).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
        }
        let op = call.operation();
        self.gates[&op].pass().await;

        let mut script = self.script.lock().unwrap();
        if let Some(err) = script.next.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        if let Some(err) = script.always.get(&op) {
            return Err(err.clone());
        }
        if let LedgerCall::GetBalance(address) = call {
            if let Some(err) = script.balances.get(address) {
                return Err(err.clone());
            }
        }
        Ok(())
    }

    fn push_block(&self) -> Block {
        let mut chain = self.chain.lock().unwrap();
        let index = chain.blocks.len() as u64;
        let prev_hash = chain
            .blocks
            .last()
            .map(|b| b.hash.clone())
            .unwrap_or_default();
        let block = Block {
            index,
            timestamp: format!("2024-05-01T00:{:02}:{:02}Z", (index / 60) % 60, index % 60),
            data: BlockData::default(),
            prev_hash,
            hash: format!("H{index}"),
            nonce: index * 1000,
        };
        chain.blocks.push(block.clone());
        block
    }

    fn transfer(&self, request: &TransactionRequest) -> Result<(), ClientError> {
        let mut chain = self.chain.lock().unwrap();
        let from = chain
            .wallets
            .iter()
            .position(|(a, _)| *a == request.from)
            .ok_or_else(|| ClientError::Rejected(format!("unknown sender {}", request.from)))?;
        let available = chain.wallets[from].1.value();
        let amount = request.amount.value();
        if available < amount {
            return Err(ClientError::Rejected("insufficient funds".into()));
        }
        chain.wallets[from].1 = Amount::new(available - amount).unwrap_or(Amount::ZERO);
        if let Some(to) = chain.wallets.iter_mut().find(|(a, _)| *a == request.to) {
            to.1 = Amount::new(to.1.value() + amount).unwrap_or(to.1);
        }
        Ok(())
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerClient for NullLedger {
    async fn list_blocks(&self) -> Result<Vec<Block>, ClientError> {
        let call = LedgerCall::ListBlocks;
        let result = match self.enter(&call).await {
            Ok(()) => Ok(self.blocks()),
            Err(e) => Err(e),
        };
        self.settle(call, result)
    }

    async fn mine(&self) -> Result<MineReceipt, ClientError> {
        let call = LedgerCall::Mine;
        let result = match self.enter(&call).await {
            Ok(()) => {
                let block = self.push_block();
                Ok(MineReceipt {
                    message: Some("Block mined successfully".into()),
                    block: Some(block),
                })
            }
            Err(e) => Err(e),
        };
        self.settle(call, result)
    }

    async fn list_wallet_addresses(&self) -> Result<Vec<WalletAddress>, ClientError> {
        let call = LedgerCall::ListWallets;
        let result = match self.enter(&call).await {
            Ok(()) => Ok(self
                .chain
                .lock()
                .unwrap()
                .wallets
                .iter()
                .map(|(a, _)| a.clone())
                .collect()),
            Err(e) => Err(e),
        };
        self.settle(call, result)
    }

    async fn create_wallet(&self) -> Result<WalletAddress, ClientError> {
        let call = LedgerCall::CreateWallet;
        let result = match self.enter(&call).await {
            Ok(()) => {
                let mut chain = self.chain.lock().unwrap();
                chain.created += 1;
                let address = WalletAddress::new(format!("NEW{}", chain.created));
                chain.wallets.push((address.clone(), Amount::ZERO));
                Ok(address)
            }
            Err(e) => Err(e),
        };
        self.settle(call, result)
    }

    async fn get_balance(&self, address: &WalletAddress) -> Result<Amount, ClientError> {
        let call = LedgerCall::GetBalance(address.clone());
        let now = self.balance_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.balance_peak.fetch_max(now, Ordering::SeqCst);

        let result = match self.enter(&call).await {
            Ok(()) => self
                .balance_of(address.as_str())
                .ok_or_else(|| ClientError::ServiceUnavailable(format!("no wallet {address}"))),
            Err(e) => Err(e),
        };
        self.balance_in_flight.fetch_sub(1, Ordering::SeqCst);
        self.settle(call, result)
    }

    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<SubmitReceipt, ClientError> {
        let call = LedgerCall::SubmitTransaction(request.clone());
        let result = match self.enter(&call).await {
            Ok(()) => self.transfer(request).map(|()| SubmitReceipt {
                message: Some("Transaction received".into()),
                transaction_id: Some(format!("tx-{}", self.count(Operation::SubmitTransaction))),
            }),
            Err(e) => Err(e),
        };
        self.settle(call, result)
    }
}
