pub mod remote;

pub use remote::RemoteWallet;

use crate::error::{Result, RpsError};
use crate::transaction::TransactionRequest;
use crate::types::{Address, ExecutionResult};
use async_trait::async_trait;
use parking_lot::RwLock;

/// Delegated signer. The client never holds keys: it builds requests and the
/// provider signs and executes them on behalf of its active account.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// The account the provider is currently connected to, if any.
    async fn current_account(&self) -> Result<Option<Address>>;

    async fn sign_and_execute(&self, tx: &TransactionRequest) -> Result<ExecutionResult>;

    /// Point the provider at another account. Providers that manage their
    /// own accounts refuse.
    fn select_account(&self, _account: Option<Address>) -> Result<()> {
        Err(RpsError::wallet(
            "The wallet provider manages its own accounts; switch in the wallet",
        ))
    }
}

/// Provider without signing capability. Useful for browsing the lobby as a
/// given address, or with no address at all.
#[derive(Debug, Default)]
pub struct ReadOnlyWallet {
    account: RwLock<Option<Address>>,
}

impl ReadOnlyWallet {
    pub fn new(account: Option<Address>) -> Self {
        Self {
            account: RwLock::new(account),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletProvider for ReadOnlyWallet {
    async fn current_account(&self) -> Result<Option<Address>> {
        Ok(self.account.read().clone())
    }

    async fn sign_and_execute(&self, _tx: &TransactionRequest) -> Result<ExecutionResult> {
        Err(RpsError::wallet(
            "Read-only wallet cannot sign transactions; configure a wallet URL",
        ))
    }

    fn select_account(&self, account: Option<Address>) -> Result<()> {
        *self.account.write() = account;
        Ok(())
    }
}
