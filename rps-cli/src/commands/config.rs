use crate::config::CliConfig;
use anyhow::Result;
use clap::Subcommand;
use dialoguer::Confirm;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write the effective configuration to the data directory
    Init {
        /// Overwrite an existing config file without asking
        #[arg(short, long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

pub async fn handle_config_command(
    cmd: ConfigCommands,
    config: &CliConfig,
    data_dir: &Path,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            // fail early on values the client would reject
            config.client_config()?;

            let path = CliConfig::path(data_dir);
            if !force && tokio::fs::try_exists(&path).await? {
                let overwrite = Confirm::new()
                    .with_prompt(format!("{} exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()?;

                if !overwrite {
                    println!("Config left unchanged.");
                    return Ok(());
                }
            }

            let path = config.save(data_dir).await?;
            println!("Config written to {}", path.display());
        }

        ConfigCommands::Show => {
            let client = config.client_config()?;
            println!("Config file: {}", CliConfig::path(data_dir).display());
            println!("{}", serde_json::to_string_pretty(config)?);
            println!();
            println!("Effective settings:");
            println!("  Network: {}", client.network);
            println!("  RPC URL: {}", client.rpc_url);
            println!("  Package: {}", client.package_id);
            println!("  Schema: {}", client.schema);
            println!(
                "  Wallet provider: {}",
                client.wallet_url.as_deref().unwrap_or("none (read-only)")
            );
        }
    }

    Ok(())
}
