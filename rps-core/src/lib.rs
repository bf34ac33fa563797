//! RPS core - ledger connectivity for the Rock Paper Scissors game
//!
//! This library reads game state from a ledger full node, builds the
//! transactions the game contract accepts, and hands them to a delegated
//! wallet provider for signing. It holds no keys and implements no
//! contract logic.

pub mod config;
pub mod error;
pub mod ledger;
pub mod stake;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use config::{ChallengeSchema, ClientConfig, Network};
pub use error::{Result, RpsError};
pub use ledger::{LedgerClient, LedgerReader, ObjectResponse};
pub use stake::{format_units, parse_stake, StakeSource};
pub use transaction::TransactionRequest;
pub use types::{Address, CoinObject, ExecutionResult, ObjectId, TokenBalance};
pub use wallet::{ReadOnlyWallet, RemoteWallet, WalletProvider};
