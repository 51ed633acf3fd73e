//! Ledger Client: a thin, typed binding to the remote ledger service.
//!
//! One method per ledger capability, each a single request/response pair.
//! Nothing is cached and nothing is retried here: every call reflects the
//! service's state at call time and every failure is surfaced exactly once.
//!
//! [`LedgerClient`] is the seam the rest of the workspace is written
//! against. [`HttpLedgerClient`] is the production implementation;
//! `aztecs-nullables` provides an in-memory one for tests.

pub mod config;
pub mod error;
pub mod http;
pub mod wire;

use std::future::Future;

use aztecs_types::{Amount, Block, TransactionRequest, WalletAddress};

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpLedgerClient;
pub use wire::{MineReceipt, SubmitReceipt};

/// The six operations the ledger service exposes.
pub trait LedgerClient: Send + Sync {
    /// `GET /blockchain`: the full chain, oldest first, in service order.
    fn list_blocks(&self) -> impl Future<Output = Result<Vec<Block>, ClientError>> + Send;

    /// `POST /mine`: ask the service to mine one block.
    fn mine(&self) -> impl Future<Output = Result<MineReceipt, ClientError>> + Send;

    /// `GET /wallets`: every wallet address the service knows.
    fn list_wallet_addresses(
        &self,
    ) -> impl Future<Output = Result<Vec<WalletAddress>, ClientError>> + Send;

    /// `POST /wallets`: create a wallet and return its address.
    fn create_wallet(&self) -> impl Future<Output = Result<WalletAddress, ClientError>> + Send;

    /// `GET /wallets/{address}/balance`: balance of a single wallet.
    fn get_balance(
        &self,
        address: &WalletAddress,
    ) -> impl Future<Output = Result<Amount, ClientError>> + Send;

    /// `POST /transactions`: submit a transfer intent.
    fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = Result<SubmitReceipt, ClientError>> + Send;
}
