use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use blockfrost_client::BlockfrostClient;
use chrono::Utc;
use clap::{Parser, Subcommand};
use signal_executor::ExecutorConfig;
use signal_validation::{validate_signal, TradingSignal, ValidationConfig};
use strike_client::{OpenPositionRequest, StrikeClient, TradeApi};

#[derive(Parser)]
#[command(name = "strike-signer")]
#[command(about = "Combine, inspect and submit Cardano perpetuals transactions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Splice a wallet witness set into an unsigned transaction
    Combine {
        /// Unsigned transaction hex, or @path to a file holding it
        #[arg(long)]
        tx: String,

        /// Witness set (or signed transaction) hex from signTx, or @path
        #[arg(long)]
        witness: String,
    },

    /// Print a JSON summary of a transaction
    Inspect {
        /// Transaction hex, or @path
        #[arg(long)]
        tx: String,
    },

    /// Validate a JSON trading signal
    Validate {
        /// Path to the signal JSON
        #[arg(long)]
        signal: PathBuf,

        /// Use the conservative thresholds instead of the environment
        #[arg(long)]
        conservative: bool,
    },

    /// Request an unsigned open-position transaction for a signal
    Open {
        /// Path to the signal JSON
        #[arg(long)]
        signal: PathBuf,

        /// Trader address passed to the venue
        #[arg(long)]
        address: String,
    },

    /// Submit a signed transaction through Blockfrost
    Submit {
        /// Signed transaction hex, or @path
        #[arg(long)]
        tx: String,

        /// Poll until the transaction is in a block
        #[arg(long)]
        wait: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env, init tracing
    dotenvy::dotenv().ok();

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // 2. Dispatch
    run(Cli::parse().command).await
}

/// Offline commands never touch the environment configuration.
async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Combine { tx, witness } => {
            let tx = read_hex_arg(&tx)?;
            let witness = read_hex_arg(&witness)?;
            let signed = tx_codec::combine_witnesses(&tx, &witness)?;
            println!("{}", signed);
        }
        Commands::Inspect { tx } => {
            let summary = tx_codec::summarize(&read_hex_arg(&tx)?)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Validate {
            signal,
            conservative,
        } => {
            let signal = read_signal(&signal)?;
            let validation_config = if conservative {
                ValidationConfig::conservative()
            } else {
                ExecutorConfig::from_env()?.validation
            };
            let result = validate_signal(&signal, &validation_config, Utc::now());
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_valid {
                std::process::exit(1);
            }
        }
        Commands::Open { signal, address } => {
            let config = ExecutorConfig::from_env()?;
            let signal = read_signal(&signal)?;
            let now = Utc::now();
            let result = validate_signal(&signal, &config.validation, now);
            if !result.is_valid {
                bail!("Signal rejected: {}", result.errors.join("; "));
            }
            let client = StrikeClient::from_env()?;
            let request = OpenPositionRequest::from_signal(&signal, address, now);
            let unsigned = client.open_position(&request).await?;
            println!("{}", unsigned.cbor);
        }
        Commands::Submit { tx, wait } => {
            let config = ExecutorConfig::from_env()?;
            let tx = read_hex_arg(&tx)?;
            let summary = tx_codec::summarize(&tx)?;
            if !summary.is_signed() {
                bail!("Transaction {} carries no vkey witnesses", summary.tx_id);
            }

            let client = BlockfrostClient::from_env()?;
            let bytes = tx_codec::decode_hex(&tx)?;
            let tx_hash = client.submit_tx(&bytes).await?;
            if tx_hash != summary.tx_id {
                tracing::warn!("Blockfrost returned {} for local id {}", tx_hash, summary.tx_id);
            }
            println!("{}", tx_hash);

            if wait {
                let timeout = match config.confirmation_timeout_secs {
                    0 => 300,
                    secs => secs,
                };
                let confirmed = client
                    .await_confirmation(
                        &tx_hash,
                        Duration::from_secs(timeout),
                        Duration::from_secs(config.confirmation_poll_secs.max(1)),
                    )
                    .await?;
                match confirmed {
                    Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
                    None => bail!("Transaction {} not confirmed after {}s", tx_hash, timeout),
                }
            }
        }
    }

    Ok(())
}

/// `@path` reads the value from a file; anything else is taken literally.
fn read_hex_arg(arg: &str) -> Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path))
            .map(|s| s.trim().to_string()),
        None => Ok(arg.trim().to_string()),
    }
}

fn read_signal(path: &PathBuf) -> Result<TradingSignal> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid signal JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNSIGNED_TX: &str = "84a1021a0002c7b5a0f5f6";

    fn wallet_witness() -> String {
        format!("a10081825820{}5840{}", "11".repeat(32), "22".repeat(64))
    }

    #[test]
    fn test_hex_arg_literal_and_file() {
        assert_eq!(read_hex_arg(" a0f6\n").unwrap(), "a0f6");

        let path = std::env::temp_dir().join(format!("strike-signer-{}.hex", std::process::id()));
        std::fs::write(&path, format!("{}\n", UNSIGNED_TX)).unwrap();
        let arg = format!("@{}", path.display());
        assert_eq!(read_hex_arg(&arg).unwrap(), UNSIGNED_TX);
        std::fs::remove_file(&path).unwrap();

        assert!(read_hex_arg("@/nonexistent/strike-signer.hex").is_err());
    }

    #[tokio::test]
    async fn test_offline_commands_ignore_broken_config() {
        std::env::set_var("TRADING_ENABLED", "maybe");

        run(Commands::Combine {
            tx: UNSIGNED_TX.to_string(),
            witness: wallet_witness(),
        })
        .await
        .unwrap();
        run(Commands::Inspect {
            tx: UNSIGNED_TX.to_string(),
        })
        .await
        .unwrap();

        let err = run(Commands::Submit {
            tx: UNSIGNED_TX.to_string(),
            wait: false,
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("TRADING_ENABLED"));

        std::env::remove_var("TRADING_ENABLED");
    }
}
