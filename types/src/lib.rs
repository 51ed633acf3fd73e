//! Fundamental types for the Aztecs ledger client.
//!
//! This crate defines the entities shared across every other crate in the
//! workspace, in the shape the ledger service puts them on the wire:
//! blocks, wallet addresses, amounts and outgoing transfer intents.
//!
//! All of them are owned by the ledger service. The client only ever holds
//! disposable copies keyed by `Block::index` or `WalletAddress`.

pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod transaction;

pub use address::WalletAddress;
pub use amount::Amount;
pub use block::{Block, BlockData, GENESIS_PREV_HASHES};
pub use error::TypesError;
pub use transaction::TransactionRequest;
