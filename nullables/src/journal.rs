//! Call journal of the nullable ledger.

use aztecs_types::{TransactionRequest, WalletAddress};

/// The ledger's operations, for scripting failures and gates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    ListBlocks,
    Mine,
    ListWallets,
    CreateWallet,
    GetBalance,
    SubmitTransaction,
}

impl Operation {
    pub const ALL: [Operation; 6] = [
        Operation::ListBlocks,
        Operation::Mine,
        Operation::ListWallets,
        Operation::CreateWallet,
        Operation::GetBalance,
        Operation::SubmitTransaction,
    ];

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Operation::Mine | Operation::CreateWallet | Operation::SubmitTransaction
        )
    }
}

/// One call as the ledger received it.
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerCall {
    ListBlocks,
    Mine,
    ListWallets,
    CreateWallet,
    GetBalance(WalletAddress),
    SubmitTransaction(TransactionRequest),
}

impl LedgerCall {
    pub fn operation(&self) -> Operation {
        match self {
            LedgerCall::ListBlocks => Operation::ListBlocks,
            LedgerCall::Mine => Operation::Mine,
            LedgerCall::ListWallets => Operation::ListWallets,
            LedgerCall::CreateWallet => Operation::CreateWallet,
            LedgerCall::GetBalance(_) => Operation::GetBalance,
            LedgerCall::SubmitTransaction(_) => Operation::SubmitTransaction,
        }
    }
}

/// Journal entries, in the order they happened.
#[derive(Clone, Debug, PartialEq)]
pub enum JournalEntry {
    Issued(LedgerCall),
    Settled { call: LedgerCall, ok: bool },
}

impl JournalEntry {
    pub fn call(&self) -> &LedgerCall {
        match self {
            JournalEntry::Issued(call) => call,
            JournalEntry::Settled { call, .. } => call,
        }
    }
}
