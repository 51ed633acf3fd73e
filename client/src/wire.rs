//! Response envelopes of the ledger's HTTP API.
//!
//! The list/create/balance envelopes are strict: a body that does not match
//! is a [`ClientError::Decode`](crate::ClientError::Decode). The mutation
//! acknowledgements are parsed leniently into receipts, because the service
//! only promises success or failure for them.

use aztecs_types::{Amount, Block, WalletAddress};
use serde::Deserialize;

/// `GET /wallets`
#[derive(Debug, Deserialize)]
pub(crate) struct WalletList {
    /// Required. `null` is the service's empty list.
    #[serde(deserialize_with = "Option::deserialize")]
    pub wallets: Option<Vec<WalletAddress>>,
}

/// `POST /wallets`
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedWallet {
    pub address: WalletAddress,
}

/// `GET /wallets/{address}/balance`
#[derive(Debug, Deserialize)]
pub(crate) struct BalanceReply {
    pub balance: Amount,
}

/// Body of a 4xx answer.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Acknowledgement of `POST /mine`.
///
/// Informational only: the mined block it may carry is never spliced into
/// a displayed chain. Views refetch the chain instead.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MineReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub block: Option<Block>,
}

impl MineReceipt {
    pub(crate) fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "mine acknowledgement has no recognised body");
            Self::default()
        })
    }
}

/// Acknowledgement of `POST /transactions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitReceipt {
    pub message: Option<String>,
    /// Identifier the service assigned to the transaction, if it echoed one.
    pub transaction_id: Option<String>,
}

#[derive(Deserialize)]
struct SubmitReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    transaction: Option<TransactionEcho>,
}

#[derive(Deserialize)]
struct TransactionEcho {
    #[serde(rename = "ID", default)]
    id: Option<String>,
}

impl SubmitReceipt {
    pub(crate) fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<SubmitReply>(body) {
            Ok(reply) => Self {
                message: reply.message,
                transaction_id: reply.transaction.and_then(|t| t.id),
            },
            Err(e) => {
                tracing::debug!(error = %e, "transaction acknowledgement has no recognised body");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_receipt_reads_message_and_block() {
        let body = br#"{"message":"Block mined successfully","block":{"Index":3,"Timestamp":"2024-05-01T04:00:00Z","Transactions":[],"PrevHash":"H2","Hash":"H3","Nonce":991}}"#;
        let receipt = MineReceipt::from_body(body);
        assert_eq!(receipt.message.as_deref(), Some("Block mined successfully"));
        assert_eq!(receipt.block.map(|b| b.index), Some(3));
    }

    #[test]
    fn mine_receipt_tolerates_any_body() {
        assert_eq!(MineReceipt::from_body(b""), MineReceipt::default());
        assert_eq!(MineReceipt::from_body(b"ok"), MineReceipt::default());
    }

    #[test]
    fn submit_receipt_reads_transaction_id() {
        let body = br#"{"message":"Transaction received","transaction":{"ID":"ab12","Vin":[],"Vout":[]}}"#;
        let receipt = SubmitReceipt::from_body(body);
        assert_eq!(receipt.transaction_id.as_deref(), Some("ab12"));
        assert_eq!(receipt.message.as_deref(), Some("Transaction received"));
    }

    #[test]
    fn wallet_list_accepts_null() {
        let list: WalletList = serde_json::from_str(r#"{"wallets":null}"#).unwrap();
        assert!(list.wallets.is_none());
    }

    #[test]
    fn wallet_list_requires_the_field() {
        assert!(serde_json::from_str::<WalletList>(r#"{"unexpected":1}"#).is_err());
    }
}
