//! extrinsic-watch
//!
//! Submit an extrinsic to a Substrate node and wait until it is included in a
//! block (or finalized), reporting the events it emitted or the module error
//! that rejected it.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args ──▶ config (file + overrides) ──▶ logging
//!                     │
//!                     ▼
//!   keyring ──▶ signer        calls ──▶ call data    (or: demo runner)
//!                     │               │
//!                     ▼               ▼
//!               ┌──────────────────────────────┐
//!               │ TxWatcher::submit_and_watch  │◀── SIGINT / SIGTERM
//!               └──────────────┬───────────────┘
//!                              │ sign_and_watch / find_meta_error
//!                              ▼
//!                        NodeClient (subxt) ──── WebSocket ───▶ node
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use subxt::tx::DynamicPayload;
use subxt_signer::sr25519::Keypair;

use extrinsic_watch::chain::{calls, keyring, NodeClient};
use extrinsic_watch::config::{load_config, validate_config, ConfigError, WatcherConfig};
use extrinsic_watch::demo::{run_service_demo, DemoOptions, StepReport};
use extrinsic_watch::lifecycle::signals;
use extrinsic_watch::observability::logging;
use extrinsic_watch::watcher::{InclusionReport, TxWatcher, WatchOptions};

#[derive(Parser)]
#[command(name = "extrinsic-watch")]
#[command(about = "Submit extrinsics to a Substrate node and watch them land", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Node WebSocket URL (overrides config).
    #[arg(short, long)]
    url: Option<String>,

    /// Allow unencrypted ws:// to non-local hosts.
    #[arg(long)]
    insecure: bool,

    /// Wait for finalization instead of block inclusion.
    #[arg(long)]
    finalized: bool,

    /// Deadline for a terminal status, 0 waits forever (overrides config).
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the inclusion report as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transfer balance, keeping the sender alive
    Transfer {
        /// Sender secret URI (defaults to $EXTRINSIC_WATCH_SURI)
        #[arg(long)]
        from: Option<String>,
        /// Recipient SS58 address or secret URI
        #[arg(long)]
        to: String,
        /// Amount in the chain's smallest unit
        #[arg(long)]
        amount: u128,
    },
    /// Store a remark on chain and emit an event for it
    Remark {
        /// Sender secret URI (defaults to $EXTRINSIC_WATCH_SURI)
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Walk a service through its lifecycle with the development accounts
    Demo {
        /// Wait for Enter before each step
        #[arg(long)]
        pause: bool,
    },
    /// Print the SS58 address (or ecdsa public key) of a secret URI
    Address {
        #[arg(long)]
        suri: String,
        /// Print the compressed ecdsa public key instead
        #[arg(long)]
        ecdsa: bool,
    },
}

/// What to submit once connected.
enum Job {
    Single { signer: Keypair, call: DynamicPayload },
    Demo(DemoOptions),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Offline; needs neither config nor a node.
    if let Commands::Address { suri, ecdsa } = &cli.command {
        if *ecdsa {
            let pair = keyring::ecdsa_keypair_from_suri(suri)?;
            println!("0x{}", hex::encode(keyring::ecdsa_public_key(&pair)));
        } else {
            println!("{}", keyring::address_of(&keyring::keypair_from_suri(suri)?));
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WatcherConfig::default(),
    };
    apply_overrides(&mut config, &cli);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.logging);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "extrinsic-watch starting");

    let job = match cli.command {
        Commands::Transfer { from, to, amount } => {
            let signer = load_signer(from.as_deref())?;
            let dest = keyring::resolve_account(&to)?;
            tracing::info!(
                from = %keyring::address_of(&signer),
                to = %dest,
                amount = amount,
                "Submitting transfer"
            );
            Job::Single {
                signer,
                call: calls::transfer_keep_alive(&dest, amount),
            }
        }
        Commands::Remark { from, message } => {
            let signer = load_signer(from.as_deref())?;
            tracing::info!(
                from = %keyring::address_of(&signer),
                bytes = message.len(),
                "Submitting remark"
            );
            Job::Single {
                signer,
                call: calls::remark_with_event(message.as_bytes()),
            }
        }
        Commands::Demo { pause } => Job::Demo(DemoOptions {
            wait_until_finalized: config.watch.wait_for_finalized,
            pause,
        }),
        Commands::Address { .. } => return Ok(()),
    };

    let client = Arc::new(NodeClient::connect(config.node.clone()).await?);
    let watcher = TxWatcher::new(client.clone(), WatchOptions::from(&config.watch));

    match job {
        Job::Single { signer, call } => {
            let report = tokio::select! {
                result = watcher.submit_and_watch(&signer, &call, config.watch.wait_for_finalized) => result?,
                _ = signals::interrupted() => {
                    tracing::warn!("Interrupted before a terminal status");
                    return Err("interrupted".into());
                }
            };
            print_report(&report, cli.json)?;
        }
        Job::Demo(options) => {
            let steps = tokio::select! {
                result = run_service_demo(&watcher, client.as_ref(), &options) => result?,
                _ = signals::interrupted() => {
                    tracing::warn!("Interrupted during the service demo");
                    return Err("interrupted".into());
                }
            };
            print_steps(&steps, cli.json)?;
        }
    }
    Ok(())
}

fn apply_overrides(config: &mut WatcherConfig, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.node.url = url.clone();
    }
    if cli.insecure {
        config.node.allow_insecure = true;
    }
    if cli.finalized {
        config.watch.wait_for_finalized = true;
    }
    if let Some(secs) = cli.timeout_secs {
        config.watch.timeout_secs = secs;
    }
}

fn load_signer(suri: Option<&str>) -> Result<Keypair, Box<dyn std::error::Error>> {
    let pair = match suri {
        Some(suri) => keyring::keypair_from_suri(suri)?,
        None => keyring::keypair_from_env()?,
    };
    Ok(pair)
}

fn print_report(report: &InclusionReport, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{} reached {} in block {}",
        report.submission,
        report.milestone.label(),
        report.block_hash
    );
    for record in &report.events {
        println!("  {}", record);
    }
    Ok(())
}

fn print_steps(steps: &[StepReport], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(steps)?);
        return Ok(());
    }

    for step in steps {
        println!("|-- {} ({})", step.step, step.signer);
        print_report(&step.report, false)?;
    }
    Ok(())
}
