//! Pre-built [`tracing::Span`] constructors for facade operations.
//!
//! Consistent span names and fields make it easy to follow one user action
//! from trigger, through the ledger calls it causes, to the refresh.

use aztecs_types::WalletAddress;
use tracing::{info_span, Span};

/// Span covering a single call to the ledger service.
pub fn ledger_call(op: &str) -> Span {
    info_span!("ledger_call", op = %op)
}

/// Span covering one user-triggered mutation, including its refresh.
pub fn mutation(action: &str) -> Span {
    info_span!("mutation", action = %action)
}

/// Span covering one attempt at refetching a view's collection.
pub fn refresh(view: &str, attempt: u32) -> Span {
    info_span!("refresh", view = %view, attempt)
}

/// Span covering the balance lookup of one wallet inside an aggregate.
pub fn balance_fetch(address: &WalletAddress) -> Span {
    info_span!("balance_fetch", address = %address)
}
