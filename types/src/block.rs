//! Blocks as returned by `GET /blockchain`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `PrevHash` values that mark the genesis block.
pub const GENESIS_PREV_HASHES: [&str; 2] = ["", "0"];

/// One block of the chain, exactly as the ledger reported it.
///
/// Blocks are immutable once received. Ordering, hashing and proof-of-work
/// all belong to the ledger; the client keeps whatever order the service
/// returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub index: u64,
    /// Wire form of the block time (RFC 3339). Parsed only when rendered.
    pub timestamp: String,
    #[serde(default, alias = "Transactions")]
    pub data: BlockData,
    pub prev_hash: String,
    pub hash: String,
    pub nonce: u64,
}

impl Block {
    /// Whether `prev_hash` is one of the genesis sentinels.
    pub fn is_genesis(&self) -> bool {
        GENESIS_PREV_HASHES.contains(&self.prev_hash.as_str())
    }

    /// Whether this block names `previous` as its predecessor.
    pub fn follows(&self, previous: &Block) -> bool {
        self.prev_hash == previous.hash
    }
}

/// Opaque block payload.
///
/// The service has shipped both a free-form `Data` string and a
/// `Transactions` array under this slot; the client only displays it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockData(pub serde_json::Value);

impl BlockData {
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::String(s) => s.is_empty(),
            serde_json::Value::Array(items) => items.is_empty(),
            serde_json::Value::Object(fields) => fields.is_empty(),
            _ => false,
        }
    }

    /// Transaction count when the payload is a transaction array.
    pub fn transaction_count(&self) -> Option<usize> {
        self.0.as_array().map(Vec::len)
    }
}

impl fmt::Display for BlockData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::Null => Ok(()),
            serde_json::Value::String(s) => write!(f, "{s}"),
            serde_json::Value::Array(items) => write!(f, "{} tx", items.len()),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENESIS_JSON: &str = r#"{
        "Index": 0,
        "Timestamp": "2024-05-01T12:00:00.123456789+08:00",
        "Transactions": [{"ID": "genesis_tx"}],
        "PrevHash": "",
        "Hash": "H0",
        "Nonce": 0
    }"#;

    #[test]
    fn decodes_service_shape_with_transactions_alias() {
        let block: Block = serde_json::from_str(GENESIS_JSON).unwrap();
        assert_eq!(block.index, 0);
        assert_eq!(block.hash, "H0");
        assert!(block.is_genesis());
        assert_eq!(block.data.transaction_count(), Some(1));
        assert_eq!(block.data.to_string(), "1 tx");
    }

    #[test]
    fn decodes_data_string_and_missing_data() {
        let block: Block = serde_json::from_str(
            r#"{"Index":1,"Timestamp":"2024-05-01T04:00:00Z","Data":"hello","PrevHash":"H0","Hash":"H1","Nonce":42}"#,
        )
        .unwrap();
        assert_eq!(block.data.to_string(), "hello");

        let bare: Block = serde_json::from_str(
            r#"{"Index":2,"Timestamp":"2024-05-01T04:00:00Z","PrevHash":"H1","Hash":"H2","Nonce":7}"#,
        )
        .unwrap();
        assert!(bare.data.is_empty());
    }

    #[test]
    fn zero_prev_hash_is_genesis() {
        let block: Block = serde_json::from_str(
            r#"{"Index":0,"Timestamp":"x","PrevHash":"0","Hash":"H0","Nonce":0}"#,
        )
        .unwrap();
        assert!(block.is_genesis());
    }

    #[test]
    fn follows_compares_linkage() {
        let genesis: Block = serde_json::from_str(GENESIS_JSON).unwrap();
        let mut next = genesis.clone();
        next.index = 1;
        next.prev_hash = "H0".into();
        next.hash = "H1".into();
        assert!(next.follows(&genesis));
        assert!(!genesis.follows(&next));
    }

    #[test]
    fn negative_index_is_rejected() {
        let res = serde_json::from_str::<Block>(
            r#"{"Index":-1,"Timestamp":"x","PrevHash":"","Hash":"H","Nonce":0}"#,
        );
        assert!(res.is_err());
    }
}
