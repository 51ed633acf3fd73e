//! Nullable infrastructure for deterministic testing.
//!
//! [`NullLedger`] implements [`aztecs_client::LedgerClient`] entirely in
//! memory. It:
//! - Keeps a scripted chain and wallet set that mutations really change
//! - Records every call, when it was issued and when it settled
//! - Injects failures per operation or per wallet address
//! - Can hold an operation pending until the test releases it
//!
//! Usage: hand a `NullLedger` to the facade wherever production code takes
//! an `HttpLedgerClient`.

pub mod gate;
pub mod journal;
pub mod ledger;

pub use gate::Gate;
pub use journal::{JournalEntry, LedgerCall, Operation};
pub use ledger::NullLedger;
