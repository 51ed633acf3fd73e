//! Plain-text tables for stdout.

use aztecs_facade::{BlockRow, ChainLink, Notice, WalletRow};

/// Lay out `rows` under `header`, each column padded to its widest cell.
fn table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = line(header.to_vec());
    for row in rows {
        out.push('\n');
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn link_label(link: ChainLink) -> &'static str {
    match link {
        ChainLink::Genesis => "genesis",
        ChainLink::Linked => "ok",
        ChainLink::Broken => "BROKEN",
    }
}

pub fn blocks(rows: &[BlockRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.index.to_string(),
                r.timestamp.clone(),
                r.hash.clone(),
                r.prev_hash.clone(),
                r.nonce.to_string(),
                r.data.clone(),
                link_label(r.link).to_string(),
            ]
        })
        .collect();
    table(
        &["INDEX", "TIMESTAMP", "HASH", "PREV HASH", "NONCE", "DATA", "LINK"],
        &cells,
    )
}

pub fn wallets(rows: &[WalletRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.address.to_string(), r.balance_label()])
        .collect();
    table(&["ADDRESS", "BALANCE"], &cells)
}

pub fn notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(m) => m.clone(),
        Notice::Warning(m) => format!("warning: {m}"),
        Notice::Error(m) => format!("error: {m}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aztecs_client::ClientError;
    use aztecs_facade::BalanceStatus;
    use aztecs_types::{Amount, WalletAddress};

    #[test]
    fn columns_are_aligned() {
        let out = table(
            &["A", "B"],
            &[vec!["long cell".into(), "x".into()], vec!["y".into(), "z".into()]],
        );
        assert_eq!(out, "A          B\nlong cell  x\ny          z");
    }

    #[test]
    fn unavailable_balance_shows_error() {
        let address = WalletAddress::new("A2");
        let rows = vec![
            WalletRow {
                key: WalletAddress::new("A1"),
                address: WalletAddress::new("A1"),
                balance: BalanceStatus::Available(Amount::new(100.0).unwrap()),
            },
            WalletRow {
                key: address.clone(),
                address,
                balance: BalanceStatus::Unavailable(ClientError::ServiceUnavailable("x".into())),
            },
        ];
        assert_eq!(wallets(&rows), "ADDRESS  BALANCE\nA1       100 AZT\nA2       Error");
    }

    #[test]
    fn block_rows_keep_their_order() {
        let row = |index: u64, link| BlockRow {
            key: index,
            index,
            timestamp: "t".into(),
            data: String::new(),
            prev_hash: format!("H{}", index.saturating_sub(1)),
            hash: format!("H{index}"),
            nonce: 7,
            link,
        };
        let out = blocks(&[row(1, ChainLink::Linked), row(0, ChainLink::Genesis)]);
        let indices: Vec<&str> = out
            .lines()
            .skip(1)
            .map(|l| l.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(indices, ["1", "0"]);
    }
}
