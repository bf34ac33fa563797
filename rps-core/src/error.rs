use thiserror::Error;

pub type Result<T> = std::result::Result<T, RpsError>;

#[derive(Error, Debug)]
pub enum RpsError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Network connection error: {0}")]
    NetworkConnection(String),

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid stake amount: {0}")]
    InvalidStake(String),

    #[error("Insufficient funds: need {need}, have {available}")]
    InsufficientFunds { need: u64, available: u64 },

    #[error("No wallet connected")]
    NotConnected,

    #[error("{0}")]
    Precondition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),
}

impl RpsError {
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    pub fn network_connection(msg: impl Into<String>) -> Self {
        Self::NetworkConnection(msg.into())
    }

    pub fn wallet(msg: impl Into<String>) -> Self {
        Self::Wallet(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_stake(msg: impl Into<String>) -> Self {
        Self::InvalidStake(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn dialog(msg: impl Into<String>) -> Self {
        Self::Dialog(msg.into())
    }
}

// conversion from dialoguer::Error
impl From<dialoguer::Error> for RpsError {
    fn from(err: dialoguer::Error) -> Self {
        RpsError::Dialog(err.to_string())
    }
}
