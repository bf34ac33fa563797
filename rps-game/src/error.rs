use rps_core::ObjectId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("{0}")]
    Core(#[from] rps_core::RpsError),

    #[error("Action already in progress: {0}")]
    AlreadyPending(String),

    #[error("Challenge not found: {0}")]
    ChallengeNotFound(ObjectId),

    #[error("{0}")]
    NotAvailable(String),

    #[error("Package not found on the network")]
    PackageNotReady,
}

impl GameError {
    pub fn not_available(msg: impl Into<String>) -> Self {
        Self::NotAvailable(msg.into())
    }

    /// Message suitable for a user notice.
    pub fn user_message(&self) -> String {
        let message = match self {
            GameError::Core(rps_core::RpsError::Wallet(msg))
            | GameError::Core(rps_core::RpsError::Rpc(msg))
            | GameError::Core(rps_core::RpsError::Precondition(msg)) => msg.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            message
        }
    }
}
