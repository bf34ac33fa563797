//! Challenge lobby for the Rock Paper Scissors game
//!
//! Discovers open challenges on the ledger, derives the lobby a given
//! account sees, and submits create, join and cancel actions through the
//! connected wallet. Game resolution happens in the contract, not here.

pub mod action;
pub mod challenge;
pub mod discovery;
pub mod error;
pub mod lobby;
pub mod notice;
pub mod query;
pub mod session;

#[cfg(test)]
mod testing;

pub use action::{ActionKey, ActionStatus, ActionTracker};
pub use challenge::Challenge;
pub use discovery::DiscoveryStrategy;
pub use error::{GameError, Result};
pub use lobby::{ChallengeStatus, LobbyAction, LobbyEntry, LobbyView};
pub use notice::{MemoryNotifier, Notice, NoticeLevel, Notifier};
pub use query::Query;
pub use session::{Session, SessionSnapshot};

use rps_core::{ClientConfig, LedgerClient, LedgerReader, ReadOnlyWallet, RemoteWallet, WalletProvider};
use std::sync::Arc;

/// Build a session against the configured full node and wallet provider.
///
/// Without a wallet URL the session stays read-only: queries run for
/// `account` but every action is refused by the wallet.
pub fn open_session(
    config: ClientConfig,
    account: Option<rps_core::Address>,
    notifier: Arc<dyn Notifier>,
) -> Result<Session> {
    let reader: Arc<dyn LedgerReader> = Arc::new(LedgerClient::new(&config)?);
    let wallet: Arc<dyn WalletProvider> = match &config.wallet_url {
        Some(url) => Arc::new(RemoteWallet::new(url)?),
        None => Arc::new(ReadOnlyWallet::new(account)),
    };
    Ok(Session::new(config, reader, wallet, notifier))
}
