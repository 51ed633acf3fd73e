//! Aztecs command-line client: browse the chain, mine, manage wallets and
//! send transfers against a ledger service.

mod render;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use aztecs_client::HttpLedgerClient;
use aztecs_facade::{
    BlockExplorer, FacadeConfig, MutationOutcome, TransactionSender, ViewState, WalletManager,
};
use aztecs_utils::{format_duration, LogFormat};
use clap::Parser;

#[derive(Parser)]
#[command(name = "aztecs", about = "Client for the Aztecs ledger service")]
struct Cli {
    /// Base URL of the ledger service.
    #[arg(long, env = "AZTECS_LEDGER_URL")]
    ledger_url: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AZTECS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AZTECS_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Maximum balance requests outstanding at once (default: all).
    #[arg(long, env = "AZTECS_BALANCE_CONCURRENCY")]
    balance_concurrency: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List the chain, oldest block first.
    Blocks,
    /// Mine one block and show the refreshed chain.
    Mine,
    /// List every wallet with its balance.
    Wallets,
    /// Create a wallet and show the refreshed wallet list.
    CreateWallet,
    /// Send an amount from one wallet to another.
    Send {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
    },
}

/// File settings as the base, flags and environment on top.
fn resolve_config(cli: &Cli) -> anyhow::Result<FacadeConfig> {
    let mut config = match &cli.config {
        Some(path) => FacadeConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => FacadeConfig::default(),
    };

    if let Some(url) = &cli.ledger_url {
        config.client.base_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format.to_string();
    }
    if cli.balance_concurrency.is_some() {
        config.balance_concurrency = cli.balance_concurrency;
    }
    config.validate()?;
    Ok(config)
}

fn print_notice<R, M>(state: &ViewState<R, M>) {
    if let Some(notice) = &state.notice {
        println!("{}", render::notice(notice));
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let format: LogFormat = config.log_format.parse()?;
    aztecs_utils::init_logging(format, &config.log_level)?;
    tracing::debug!(ledger = %config.client.base_url, "configuration resolved");

    let client = Arc::new(HttpLedgerClient::new(&config.client)?);
    let started = Instant::now();

    match cli.command {
        Command::Blocks => {
            let explorer = BlockExplorer::new(client, &config)?;
            explorer.load().await.context("failed to load blocks")?;
            println!("{}", render::blocks(&explorer.state().rows));
        }
        Command::Mine => {
            let explorer = BlockExplorer::new(client, &config)?;
            let outcome = explorer.mine().await;
            let state = explorer.state();
            print_notice(&state);
            if let MutationOutcome::Failed(e) = outcome {
                bail!("mining failed: {e}");
            }
            if !state.stale {
                println!("{}", render::blocks(&state.rows));
            }
        }
        Command::Wallets => {
            let manager = WalletManager::new(client, &config);
            manager.load().await.context("failed to load wallets")?;
            println!("{}", render::wallets(&manager.state().rows));
        }
        Command::CreateWallet => {
            let manager = WalletManager::new(client, &config);
            let outcome = manager.create_wallet().await;
            let state = manager.state();
            print_notice(&state);
            if let MutationOutcome::Failed(e) = outcome {
                bail!("wallet creation failed: {e}");
            }
            if !state.stale {
                println!("{}", render::wallets(&state.rows));
            }
        }
        Command::Send { from, to, amount } => {
            let sender = TransactionSender::new(client, &config);
            let outcome = sender.submit(&from, &to, amount).await;
            print_notice(&sender.state());
            if let MutationOutcome::Failed(e) = outcome {
                bail!("transaction failed: {e}");
            }
            if let Some(id) = sender.state().meta.last_receipt.and_then(|r| r.transaction_id) {
                println!("transaction id: {id}");
            }
        }
    }

    tracing::info!(elapsed = %format_duration(started.elapsed()), "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("aztecs").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_without_file_or_flags() {
        let config = resolve_config(&parse(&["blocks"])).unwrap();
        assert_eq!(config, FacadeConfig::default());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aztecs.toml");
        std::fs::write(
            &path,
            "log_level = \"warn\"\nbalance_concurrency = 4\n\n[client]\nbase_url = \"http://ledger:9000\"\n",
        )
        .unwrap();
        let path = path.to_string_lossy().to_string();

        let config = resolve_config(&parse(&[
            "--config",
            &path,
            "--ledger-url",
            "http://127.0.0.1:8080",
            "wallets",
        ]))
        .unwrap();

        assert_eq!(config.client.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.balance_concurrency, Some(4));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert!(resolve_config(&parse(&["--balance-concurrency", "0", "wallets"])).is_err());
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(resolve_config(&parse(&["--config", "/nonexistent/aztecs.toml", "blocks"])).is_err());
    }

    #[test]
    fn send_takes_named_arguments() {
        let cli = parse(&["send", "--from", "A1", "--to", "B2", "--amount", "2.5"]);
        match cli.command {
            Command::Send { from, to, amount } => {
                assert_eq!((from.as_str(), to.as_str(), amount), ("A1", "B2", 2.5));
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn negative_amount_parses_and_is_left_to_validation() {
        let cli = parse(&["send", "--from", "A1", "--to", "B2", "--amount", "-3"]);
        match cli.command {
            Command::Send { amount, .. } => assert_eq!(amount, -3.0),
            _ => panic!("expected send"),
        }
    }
}
