//! Auction contract client CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   auction-client <command>
//!        │
//!        ▼
//!   ┌──────────────┐   invoke / status   ┌──────────────┐
//!   │ AuctionClient│────────────────────▶│ chain node   │
//!   │              │                     │ (JSON-RPC)   │
//!   │   codec      │   sign + submit     ├──────────────┤
//!   │   lifecycle  │────────────────────▶│ wallet bridge│
//!   │   cache      │                     │ (JSON-RPC)   │
//!   │              │   challenge / prove ├──────────────┤
//!   │              │────────────────────▶│ verifier     │
//!   └──────────────┘                     │ (HTTP)       │
//!                                        └──────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use auction_client::auction::{AuctionError, TokenId};
use auction_client::blockchain::types::{ContractAddress, TransactionHandle, TransactionOutcome};
use auction_client::blockchain::wallet::WalletProvider;
use auction_client::config::load_config;
use auction_client::lifecycle::{signals::cancel_on_signal, CancelToken};
use auction_client::observability::{logging, metrics};
use auction_client::DefaultAuctionClient;

#[derive(Parser)]
#[command(name = "auction-client")]
#[command(about = "Client for the dino_auction contract", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Contract index, overriding the configured one
    #[arg(long)]
    contract: Option<u64>,

    /// Account to act as; asks the wallet when omitted
    #[arg(short, long)]
    account: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and print the selected account
    Connect,
    /// Print accounts, their tokens, and all auction tokens
    View,
    /// Print the contract owner
    Owner,
    /// Print balances of a token
    Balance { token: TokenId },
    /// Check whether the account takes part in an auction
    Participating { token: TokenId },
    /// Prove identity and join an auction
    Enter { token: TokenId },
    /// Leave an auction
    Leave { token: TokenId },
    /// Open an auction (owner only)
    InitAuction {
        token: TokenId,
        #[arg(short, long, default_value_t = 100)]
        quantity: u64,
    },
    /// Close an auction (owner only)
    BurnAuction { token: TokenId },
    /// Create a new contract instance
    InitContract,
    /// Wait for a submitted transaction to finalize
    Status { tx_hash: String },
    /// Print wallet events until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config.display(), e);
            return ExitCode::from(2);
        }
    };

    logging::init_logging(&config.observability.log_level);
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::warn!(error = %e, "Invalid metrics address, metrics disabled"),
        }
    }

    let cancel = CancelToken::new();
    cancel_on_signal(cancel.clone());

    let mut client = match DefaultAuctionClient::from_config(&config, cancel.clone()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    if let Some(index) = cli.contract {
        client = client.with_address(ContractAddress::new(index));
    }

    match run(&client, cli.account, cli.command, &cancel).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "Command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    client: &DefaultAuctionClient,
    account: Option<String>,
    command: Commands,
    cancel: &CancelToken,
) -> Result<ExitCode, AuctionError> {
    match command {
        Commands::Connect => {
            println!("{}", client.wallet().connect().await?);
        }
        Commands::View => print_json(&client.view().await?),
        Commands::Owner => println!("{}", client.owner().await?),
        Commands::Balance { token } => {
            let account = resolve_account(client, account).await?;
            print_json(&client.balance_of(&token, &account).await?);
        }
        Commands::Participating { token } => {
            let account = resolve_account(client, account).await?;
            match client.is_participant(&token, &account).await? {
                Some(true) => println!("participating"),
                Some(false) => println!("not participating"),
                None => println!("unknown"),
            }
        }
        Commands::Enter { token } => {
            let account = resolve_account(client, account).await?;
            return Ok(report(client.enter_auction(&token, &account).await?));
        }
        Commands::Leave { token } => {
            let account = resolve_account(client, account).await?;
            return Ok(report(client.leave_auction(&token, &account).await?));
        }
        Commands::InitAuction { token, quantity } => {
            let account = resolve_account(client, account).await?;
            return Ok(report(client.init_auction(&token, quantity, &account).await?));
        }
        Commands::BurnAuction { token } => {
            let account = resolve_account(client, account).await?;
            return Ok(report(client.burn_auction(&token, &account).await?));
        }
        Commands::InitContract => {
            let account = resolve_account(client, account).await?;
            let address = client.initialize_contract(&account).await?;
            println!("contract {} (index {})", address, address.index);
        }
        Commands::Status { tx_hash } => {
            let handle = TransactionHandle(tx_hash);
            return Ok(report(client.await_transaction(&handle).await?));
        }
        Commands::Watch => {
            let mut events = client.wallet().subscribe();
            let pump = client.wallet().spawn_event_pump(cancel.clone());
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => println!("{:?}", event),
                        None => break,
                    },
                }
            }
            pump.abort();
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn resolve_account(
    client: &DefaultAuctionClient,
    account: Option<String>,
) -> Result<String, AuctionError> {
    match account {
        Some(account) => Ok(account),
        None => Ok(client.wallet().connect().await?),
    }
}

fn report(outcome: TransactionOutcome) -> ExitCode {
    match outcome {
        TransactionOutcome::Success { events } => {
            println!("finalized: success ({} events)", events.len());
            ExitCode::SUCCESS
        }
        TransactionOutcome::Rejected { reason } => {
            println!("finalized: rejected ({})", reason);
            ExitCode::FAILURE
        }
        TransactionOutcome::TimedOut { attempts } => {
            println!("not finalized after {} polls", attempts);
            ExitCode::FAILURE
        }
        TransactionOutcome::Pending => {
            println!("pending");
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}
