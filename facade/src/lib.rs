//! State synchronisation between a presentation layer and the ledger
//! service.
//!
//! The facade never computes ledger state. It asks the service, normalises
//! what comes back, and replaces whole collections:
//! - [`BalanceAggregator`]: fan out one balance request per wallet, join them
//!   into one ordered result, isolate per-address failures
//! - [`MutationController`]: `Idle -> Pending -> Idle` around a mutating call,
//!   coalescing overlapping triggers, refreshing only after success
//! - [`view_model`]: raw payloads to display rows, applied once at ingestion
//! - [`BlockExplorer`], [`WalletManager`], [`TransactionSender`]: one state
//!   owner per view, published through `tokio::sync::watch`

pub mod balances;
pub mod config;
pub mod controller;
pub mod error;
pub mod explorer;
pub mod spans;
pub mod transfer;
pub mod view;
pub mod view_model;
pub mod wallets;

pub use balances::{BalanceAggregator, BalanceStatus, WalletBalance};
pub use config::{FacadeConfig, TimestampConfig};
pub use controller::{MutationController, MutationOutcome, Phase, RefreshOutcome};
pub use error::FacadeError;
pub use explorer::{BlockExplorer, BlockExplorerState};
pub use transfer::{SenderMeta, TransactionSender, TransactionSenderState};
pub use view::{Fetch, Notice, ViewCell, ViewState};
pub use view_model::{BlockRow, ChainLink, TimestampRenderer, WalletRow};
pub use wallets::{WalletManager, WalletManagerState, WalletMeta};
