pub mod challenge;
pub mod config;
pub mod lobby;
pub mod play;
pub mod status;

pub use challenge::{handle_cancel, handle_create, handle_join};
pub use config::{handle_config_command, ConfigCommands};
pub use lobby::handle_lobby;
pub use play::handle_play;
pub use status::{handle_balance, handle_status};

use crate::config::CliConfig;
use anyhow::Result;
use rps_game::{GameError, Notice, NoticeLevel, Notifier, Session};
use std::fmt;
use std::sync::Arc;

/// Prints notices as they arrive.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {}", notice.message),
            NoticeLevel::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

/// An action failure that was already shown through a notice.
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("action failed")
    }
}

impl std::error::Error for Reported {}

/// Map an action result for the one-shot commands.
pub(crate) fn reported<T>(result: rps_game::Result<T>) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(GameError::AlreadyPending(key)) => Err(GameError::AlreadyPending(key).into()),
        Err(_) => Err(Reported.into()),
    }
}

/// Message for an action failure the notifier did not already show.
pub(crate) fn unreported<T>(result: rps_game::Result<T>) -> Option<String> {
    match reported(result) {
        Ok(_) => None,
        Err(e) if e.downcast_ref::<Reported>().is_some() => None,
        Err(e) => Some(e.to_string()),
    }
}

/// Open a session for the configured network and load every query.
pub async fn connect(config: &CliConfig) -> Result<Session> {
    let client = config.client_config()?;
    let account = config.account()?;
    tracing::debug!("Connecting to {} at {}", client.network, client.rpc_url);
    let session = rps_game::open_session(client, account, Arc::new(ConsoleNotifier))?;

    session.connect().await?;
    Ok(session)
}
