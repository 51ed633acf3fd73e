//! `reqwest`-backed [`LedgerClient`].

use std::time::Duration;

use aztecs_types::{Amount, Block, TransactionRequest, WalletAddress};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::wire::{BalanceReply, CreatedWallet, ErrorBody, WalletList};
use crate::{ClientConfig, ClientError, LedgerClient, MineReceipt, SubmitReceipt};

/// HTTP client for the ledger service.
///
/// Wraps `reqwest::Client` with the service's base URL. Cloning is cheap and
/// shares the connection pool.
#[derive(Clone, Debug)]
pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpLedgerClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::Config(format!("invalid base URL {}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Config(format!(
                "base URL {} cannot carry a path",
                config.base_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, base_url })
    }

    /// The configured service URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Config(format!("base URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issue a request and return the status and raw body. Transport
    /// failures become `ServiceUnavailable`; the status is left to the caller.
    async fn call(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&TransactionRequest>,
    ) -> Result<(StatusCode, Vec<u8>), ClientError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "ledger request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::ServiceUnavailable(format!("request failed: {e}")))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::ServiceUnavailable(format!("failed to read response: {e}")))?;
        Ok((status, bytes.to_vec()))
    }

    /// A call whose only acceptable answer is 2xx.
    async fn call_ok(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<Vec<u8>, ClientError> {
        let (status, body) = self.call(method, segments, None).await?;
        if !status.is_success() {
            return Err(ClientError::ServiceUnavailable(format!(
                "ledger returned HTTP {status}"
            )));
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        what: &str,
    ) -> Result<T, ClientError> {
        let body = self.call_ok(Method::GET, segments).await?;
        decode(&body, what)
    }
}

fn decode<T: DeserializeOwned>(body: &[u8], what: &str) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(format!("invalid {what}: {e}")))
}

/// Rejection text: the body's `error` field, else the status line.
fn rejection_reason(status: StatusCode, body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(err) => err.error,
        Err(_) => format!("ledger returned HTTP {status}"),
    }
}

impl LedgerClient for HttpLedgerClient {
    async fn list_blocks(&self) -> Result<Vec<Block>, ClientError> {
        self.get_json(&["blockchain"], "blockchain response").await
    }

    async fn mine(&self) -> Result<MineReceipt, ClientError> {
        let body = self.call_ok(Method::POST, &["mine"]).await?;
        Ok(MineReceipt::from_body(&body))
    }

    async fn list_wallet_addresses(&self) -> Result<Vec<WalletAddress>, ClientError> {
        let list: WalletList = self.get_json(&["wallets"], "wallet list").await?;
        Ok(list.wallets.unwrap_or_default())
    }

    async fn create_wallet(&self) -> Result<WalletAddress, ClientError> {
        let body = self.call_ok(Method::POST, &["wallets"]).await?;
        let created: CreatedWallet = decode(&body, "create-wallet response")?;
        Ok(created.address)
    }

    async fn get_balance(&self, address: &WalletAddress) -> Result<Amount, ClientError> {
        let reply: BalanceReply = self
            .get_json(&["wallets", address.as_str(), "balance"], "balance response")
            .await?;
        Ok(reply.balance)
    }

    async fn submit_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<SubmitReceipt, ClientError> {
        if !request.from.is_valid() || !request.to.is_valid() {
            return Err(ClientError::InvalidRequest("sender and recipient are required".into()));
        }
        if !request.amount.is_positive() {
            return Err(ClientError::InvalidRequest("amount must be greater than 0".into()));
        }

        let (status, body) = self
            .call(Method::POST, &["transactions"], Some(request))
            .await?;
        if status.is_client_error() {
            return Err(ClientError::Rejected(rejection_reason(status, &body)));
        }
        if !status.is_success() {
            return Err(ClientError::ServiceUnavailable(format!(
                "ledger returned HTTP {status}"
            )));
        }
        Ok(SubmitReceipt::from_body(&body))
    }
}
