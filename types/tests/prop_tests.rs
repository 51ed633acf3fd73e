use proptest::prelude::*;

use aztecs_types::{Amount, Block, TransactionRequest, WalletAddress};

proptest! {
    /// Amount accepts exactly the finite non-negative values.
    #[test]
    fn amount_accepts_only_non_negative(v in proptest::num::f64::ANY) {
        let ok = Amount::new(v).is_ok();
        prop_assert_eq!(ok, v.is_finite() && v >= 0.0);
    }

    /// Amount ordering follows the wrapped value.
    #[test]
    fn amount_ordering(a in 0.0f64..1e12, b in 0.0f64..1e12) {
        let (x, y) = (Amount::new(a).unwrap(), Amount::new(b).unwrap());
        prop_assert_eq!(x <= y, a <= b);
    }

    /// A transfer intent is built iff both addresses are non-blank and the
    /// amount is strictly positive.
    #[test]
    fn transaction_request_validation(
        from in "[ a-zA-Z0-9]{0,12}",
        to in "[ a-zA-Z0-9]{0,12}",
        amount in -10.0f64..10.0,
    ) {
        let expected = !from.trim().is_empty() && !to.trim().is_empty() && amount > 0.0;
        prop_assert_eq!(TransactionRequest::new(&from, &to, amount).is_ok(), expected);
    }

    /// Any non-blank address parses back to its trimmed form.
    #[test]
    fn address_parse_trims(core in "[a-zA-Z0-9]{1,40}", pad in " {0,3}") {
        let raw = format!("{pad}{core}{pad}");
        let parsed = WalletAddress::parse(&raw).unwrap();
        prop_assert_eq!(parsed.as_str(), core.as_str());
    }

    /// Decoding a block keeps every field the service sent.
    #[test]
    fn block_decode_preserves_fields(index in 0u64..u64::MAX, nonce in 0u64..u64::MAX, hash in "[0-9a-f]{64}") {
        let json = serde_json::json!({
            "Index": index,
            "Timestamp": "2024-05-01T04:00:00Z",
            "Data": "payload",
            "PrevHash": "0",
            "Hash": hash,
            "Nonce": nonce,
        });
        let block: Block = serde_json::from_value(json).unwrap();
        prop_assert_eq!(block.index, index);
        prop_assert_eq!(block.nonce, nonce);
        prop_assert!(block.is_genesis());
        prop_assert_eq!(block.hash.as_str(), hash.as_str());
    }
}
