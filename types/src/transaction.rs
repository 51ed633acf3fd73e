//! Outgoing transfer intent for `POST /transactions`.

use serde::{Deserialize, Serialize};

use crate::{Amount, TypesError, WalletAddress};

/// A transfer the user asked for.
///
/// Unsigned: signing is the ledger's responsibility. Holding one of these
/// says nothing about whether the ledger accepted it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransactionRequest {
    pub from: WalletAddress,
    pub to: WalletAddress,
    pub amount: Amount,
}

impl TransactionRequest {
    /// Build a transfer intent, requiring both addresses and a strictly
    /// positive amount.
    pub fn new(from: &str, to: &str, amount: f64) -> Result<Self, TypesError> {
        let from = WalletAddress::parse(from)?;
        let to = WalletAddress::parse(to)?;
        let amount = Amount::new(amount)?;
        if !amount.is_positive() {
            return Err(TypesError::InvalidAmount("amount must be greater than 0".into()));
        }
        Ok(Self { from, to, amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_service_field_names() {
        let tx = TransactionRequest::new("A1", "B2", 5.0).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json, serde_json::json!({"From": "A1", "To": "B2", "Amount": 5.0}));
    }

    #[test]
    fn rejects_zero_amount() {
        let err = TransactionRequest::new("A1", "B2", 0.0).unwrap_err();
        assert!(matches!(err, TypesError::InvalidAmount(_)));
    }

    #[test]
    fn rejects_missing_addresses() {
        assert!(matches!(
            TransactionRequest::new("", "B2", 1.0),
            Err(TypesError::InvalidAddress(_))
        ));
        assert!(matches!(
            TransactionRequest::new("A1", " ", 1.0),
            Err(TypesError::InvalidAddress(_))
        ));
    }
}
