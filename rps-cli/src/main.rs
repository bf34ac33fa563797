mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::{CliConfig, Overrides};
use rps_core::{format_units, RpsError};
use rps_game::{GameError, Session};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rps")]
#[command(about = "Rock Paper Scissors challenge lobby")]
#[command(version)]
struct Cli {
    /// Data directory for the config file
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Network to use (devnet, testnet, mainnet, localnet)
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Full node JSON-RPC endpoint
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Game package id
    #[arg(long, global = true)]
    package: Option<String>,

    /// Challenge layout of the deployed contract (shared, owned)
    #[arg(long, global = true)]
    schema: Option<String>,

    /// Wallet provider that signs transactions
    #[arg(long, global = true)]
    wallet_url: Option<String>,

    /// Browse as this account when no wallet provider is set
    #[arg(short, long, global = true)]
    account: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show account, contract readiness and balance
    Status,
    /// Show token balance and coin objects
    Balance,
    /// List challenges
    Lobby {
        /// Include completed challenges
        #[arg(long)]
        all: bool,
    },
    /// Create a challenge
    Create {
        /// Stake in RPS, e.g. 1.50
        amount: String,
    },
    /// Join an open challenge
    Join {
        /// Challenge object id
        challenge: String,
    },
    /// Cancel one of your open challenges
    Cancel {
        /// Challenge object id
        challenge: String,
    },
    /// Interactive lobby
    Play,
    /// Configuration commands
    #[command(subcommand)]
    Config(commands::ConfigCommands),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "rps={},rps_core={},rps_game={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let data_dir = cli.data_dir.unwrap_or_else(config::default_data_dir);

    let overrides = Overrides {
        network: cli.network,
        rpc_url: cli.rpc_url,
        package_id: cli.package,
        schema: cli.schema,
        wallet_url: cli.wallet_url,
        account: cli.account,
    };

    let result = run(cli.command, &data_dir, overrides).await;

    if let Err(e) = result {
        if e.downcast_ref::<commands::Reported>().is_none() {
            match e.downcast_ref::<GameError>() {
                Some(GameError::Core(RpsError::NetworkConnection(msg))) => {
                    eprintln!("Error: Cannot reach the network: {}", msg);
                    eprintln!("Check --rpc-url or 'rps config show'");
                }
                Some(GameError::Core(RpsError::InsufficientFunds { need, available })) => {
                    eprintln!("Error: Insufficient funds");
                    eprintln!(
                        "Need: {} RPS, Available: {} RPS",
                        format_units(*need),
                        format_units(*available)
                    );
                }
                Some(game) => eprintln!("Error: {}", game.user_message()),
                None => eprintln!("Error: {:#}", e),
            }
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, data_dir: &Path, overrides: Overrides) -> anyhow::Result<()> {
    let mut config = CliConfig::load(data_dir).await?;
    config.apply(overrides)?;

    match command {
        Commands::Config(cmd) => commands::handle_config_command(cmd, &config, data_dir).await,
        other => {
            let session = commands::connect(&config).await?;
            dispatch(other, &session).await
        }
    }
}

async fn dispatch(command: Commands, session: &Session) -> anyhow::Result<()> {
    match command {
        Commands::Status => commands::handle_status(session).await,
        Commands::Balance => commands::handle_balance(session).await,
        Commands::Lobby { all } => commands::handle_lobby(session, all).await,
        Commands::Create { amount } => commands::handle_create(session, &amount).await,
        Commands::Join { challenge } => commands::handle_join(session, &challenge).await,
        Commands::Cancel { challenge } => commands::handle_cancel(session, &challenge).await,
        Commands::Play => commands::handle_play(session).await,
        Commands::Config(_) => Ok(()),
    }
}
