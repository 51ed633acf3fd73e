//! View models: raw ledger payloads to display rows.
//!
//! Normalisation is pure and happens exactly once, where data enters a view.
//! The input and output types differ (`Block` in, `BlockRow` out), so a row
//! cannot be normalised a second time by accident.

use std::fmt::Write as _;

use aztecs_types::{Block, WalletAddress};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, Utc};

use crate::balances::{BalanceStatus, WalletBalance};
use crate::config::TimestampConfig;
use crate::FacadeError;

// ── Timestamps ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Local,
    Utc,
    Fixed(FixedOffset),
}

/// Renders the ledger's RFC 3339 block times for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimestampRenderer {
    zone: Zone,
    pattern: String,
}

impl TimestampRenderer {
    pub fn from_config(config: &TimestampConfig) -> Result<Self, FacadeError> {
        let zone = match config.zone.to_ascii_lowercase().as_str() {
            "local" => Zone::Local,
            "utc" => Zone::Utc,
            other => Zone::Fixed(other.parse::<FixedOffset>().map_err(|e| {
                FacadeError::Timestamp(format!("zone {:?}: {e}", config.zone))
            })?),
        };
        if StrftimeItems::new(&config.pattern).any(|item| matches!(item, Item::Error)) {
            return Err(FacadeError::Timestamp(format!(
                "pattern {:?} is not a valid strftime pattern",
                config.pattern
            )));
        }
        Ok(Self {
            zone,
            pattern: config.pattern.clone(),
        })
    }

    /// Render UTC times with the default pattern.
    pub fn utc() -> Self {
        Self {
            zone: Zone::Utc,
            pattern: TimestampConfig::default().pattern,
        }
    }

    /// Render a wire timestamp. Input that does not parse is shown as-is.
    pub fn render(&self, wire: &str) -> String {
        let parsed = match DateTime::parse_from_rfc3339(wire) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(timestamp = wire, error = %e, "unparseable block timestamp");
                return wire.to_string();
            }
        };
        let mut out = String::new();
        let written = match self.zone {
            Zone::Local => write!(out, "{}", parsed.with_timezone(&Local).format(&self.pattern)),
            Zone::Utc => write!(out, "{}", parsed.with_timezone(&Utc).format(&self.pattern)),
            Zone::Fixed(offset) => write!(out, "{}", parsed.with_timezone(&offset).format(&self.pattern)),
        };
        match written {
            Ok(()) => out,
            Err(_) => wire.to_string(),
        }
    }
}

impl Default for TimestampRenderer {
    fn default() -> Self {
        Self {
            zone: Zone::Local,
            pattern: TimestampConfig::default().pattern,
        }
    }
}

// ── Blocks ─────────────────────────────────────────────────────────────

/// How a row relates to the row displayed before it. Display only: the
/// ledger owns validity, and rows are never dropped or reordered over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainLink {
    Genesis,
    Linked,
    Broken,
}

/// A block as the explorer displays it.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRow {
    /// Row identity, from the block index.
    pub key: u64,
    pub index: u64,
    pub timestamp: String,
    pub data: String,
    pub prev_hash: String,
    pub hash: String,
    pub nonce: u64,
    pub link: ChainLink,
}

/// Normalise a chain in service order.
pub fn normalize_blocks(blocks: Vec<Block>, renderer: &TimestampRenderer) -> Vec<BlockRow> {
    let mut rows: Vec<BlockRow> = Vec::with_capacity(blocks.len());
    let mut previous: Option<Block> = None;
    for block in blocks {
        let link = if block.is_genesis() {
            ChainLink::Genesis
        } else if previous.as_ref().is_some_and(|p| block.follows(p)) {
            ChainLink::Linked
        } else {
            ChainLink::Broken
        };
        rows.push(BlockRow {
            key: block.index,
            index: block.index,
            timestamp: renderer.render(&block.timestamp),
            data: block.data.to_string(),
            prev_hash: block.prev_hash.clone(),
            hash: block.hash.clone(),
            nonce: block.nonce,
            link,
        });
        previous = Some(block);
    }
    rows
}

// ── Wallets ────────────────────────────────────────────────────────────

/// A wallet as the wallet views display it.
#[derive(Clone, Debug, PartialEq)]
pub struct WalletRow {
    /// Row identity, from the address.
    pub key: WalletAddress,
    pub address: WalletAddress,
    pub balance: BalanceStatus,
}

impl WalletRow {
    /// "100 AZT", or "Error" when the balance could not be fetched.
    pub fn balance_label(&self) -> String {
        self.balance.to_string()
    }
}

pub fn normalize_wallets(entries: Vec<WalletBalance>) -> Vec<WalletRow> {
    entries
        .into_iter()
        .map(|entry| WalletRow {
            key: entry.address.clone(),
            address: entry.address,
            balance: entry.balance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aztecs_client::ClientError;
    use aztecs_types::{Amount, BlockData};

    fn block(index: u64, prev: &str, hash: &str) -> Block {
        Block {
            index,
            timestamp: "2024-05-01T12:00:00.5+08:00".into(),
            data: BlockData::default(),
            prev_hash: prev.into(),
            hash: hash.into(),
            nonce: index,
        }
    }

    #[test]
    fn renders_rfc3339_in_configured_zone() {
        let utc = TimestampRenderer::utc();
        assert_eq!(utc.render("2024-05-01T12:00:00.123456789+08:00"), "2024-05-01 04:00:00");

        let tokyo = TimestampRenderer::from_config(&TimestampConfig {
            zone: "+09:00".into(),
            pattern: "%H:%M".into(),
        })
        .unwrap();
        assert_eq!(tokyo.render("2024-05-01T00:00:00Z"), "09:00");
    }

    #[test]
    fn unparseable_timestamp_is_shown_raw() {
        assert_eq!(TimestampRenderer::utc().render("yesterday"), "yesterday");
    }

    #[test]
    fn rejects_bad_zone_and_pattern() {
        let bad_zone = TimestampConfig {
            zone: "mars".into(),
            ..TimestampConfig::default()
        };
        assert!(TimestampRenderer::from_config(&bad_zone).is_err());

        let bad_pattern = TimestampConfig {
            zone: "utc".into(),
            pattern: "%Q".into(),
        };
        assert!(TimestampRenderer::from_config(&bad_pattern).is_err());
    }

    #[test]
    fn rows_keep_service_order_and_mark_linkage() {
        let rows = normalize_blocks(
            vec![block(0, "0", "H0"), block(1, "H0", "H1"), block(2, "HX", "H2")],
            &TimestampRenderer::utc(),
        );
        let keys: Vec<_> = rows.iter().map(|r| r.key).collect();
        assert_eq!(keys, [0, 1, 2]);
        assert_eq!(rows[0].link, ChainLink::Genesis);
        assert_eq!(rows[1].link, ChainLink::Linked);
        assert_eq!(rows[2].link, ChainLink::Broken);
        assert_eq!(rows[1].timestamp, "2024-05-01 04:00:00");
    }

    #[test]
    fn out_of_order_input_is_not_reordered() {
        let rows = normalize_blocks(
            vec![block(1, "H0", "H1"), block(0, "", "H0")],
            &TimestampRenderer::utc(),
        );
        assert_eq!(rows[0].index, 1);
        assert_eq!(rows[0].link, ChainLink::Broken);
        assert_eq!(rows[1].link, ChainLink::Genesis);
    }

    #[test]
    fn wallet_rows_keyed_by_address() {
        let rows = normalize_wallets(vec![
            WalletBalance {
                address: "A1".into(),
                balance: BalanceStatus::Available(Amount::new(100.0).unwrap()),
            },
            WalletBalance {
                address: "A2".into(),
                balance: BalanceStatus::Unavailable(ClientError::ServiceUnavailable("x".into())),
            },
        ]);
        assert_eq!(rows[0].key.as_str(), "A1");
        assert_eq!(rows[0].balance_label(), "100 AZT");
        assert_eq!(rows[1].balance_label(), "Error");
    }
}
