use crate::error::{Result, RpsError};
use crate::types::{Address, ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PACKAGE_ID: &str =
    "0xa8cef4c6922a112de65e68e086a1796b115419feeb8c97eaafde24296c0dcafd";
pub const DEFAULT_TREASURY_CAP_ID: &str =
    "0x95b5afdc04c0154d0675714bc965d07490fef0fe4ecc0742ac05f4ae660186a4";
pub const DEFAULT_KNOWN_ADDRESSES: [&str; 2] = [
    "0x4b7a68b6293f08efa401feefb329be3c73956efd2a09caf98d6cdc2d13b9feec",
    "0xd7a8dfef94eca3e56b54afff4116cd04f55b3be16b05d38106d2130e7d39774a",
];

pub const GAME_MODULE: &str = "rps_game";
pub const TOKEN_MODULE: &str = "rps_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Devnet,
    Testnet,
    Mainnet,
    Localnet,
}

impl Network {
    pub fn fullnode_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
            Network::Localnet => "http://127.0.0.1:9000",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
            Network::Localnet => "localnet",
        };
        f.write_str(name)
    }
}

impl FromStr for Network {
    type Err = RpsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            "localnet" | "local" => Ok(Network::Localnet),
            other => Err(RpsError::config(format!("Unknown network '{}'", other))),
        }
    }
}

/// Layout of the deployed challenge contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeSchema {
    /// Challenges are owned objects; creation mints the stake through a treasury capability.
    Owned,
    /// Challenges are shared objects carrying a `creator` field and announced by events.
    Shared,
}

impl FromStr for ChallengeSchema {
    type Err = RpsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "owned" | "legacy" => Ok(ChallengeSchema::Owned),
            "shared" => Ok(ChallengeSchema::Shared),
            other => Err(RpsError::config(format!("Unknown schema '{}'", other))),
        }
    }
}

impl fmt::Display for ChallengeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeSchema::Owned => f.write_str("owned"),
            ChallengeSchema::Shared => f.write_str("shared"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub network: Network,
    pub rpc_url: String,
    pub package_id: ObjectId,
    pub treasury_cap_id: Option<ObjectId>,
    pub known_addresses: Vec<Address>,
    pub schema: ChallengeSchema,
    pub wallet_url: Option<String>,
    pub gas_budget: u64,
    pub request_timeout: Duration,
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            network: Network::Devnet,
            rpc_url: Network::Devnet.fullnode_url().to_string(),
            package_id: ObjectId::from_canonical(DEFAULT_PACKAGE_ID),
            treasury_cap_id: Some(ObjectId::from_canonical(DEFAULT_TREASURY_CAP_ID)),
            known_addresses: DEFAULT_KNOWN_ADDRESSES
                .iter()
                .map(|a| Address::from_canonical(a))
                .collect(),
            schema: ChallengeSchema::Shared,
            wallet_url: None,
            gas_budget: 10_000_000,
            request_timeout: Duration::from_secs(30),
            page_size: 50,
        }
    }
}

impl ClientConfig {
    pub fn new(network: Network) -> Self {
        let mut config = Self::default();
        config.network = network;
        config.rpc_url = network.fullnode_url().to_string();
        config
    }

    pub fn coin_type(&self) -> String {
        format!("{}::{}::RPS_TOKEN", self.package_id, TOKEN_MODULE)
    }

    pub fn challenge_type(&self) -> String {
        format!("{}::{}::Challenge", self.package_id, GAME_MODULE)
    }

    pub fn challenge_created_event(&self) -> String {
        format!("{}::{}::ChallengeCreated", self.package_id, GAME_MODULE)
    }

    pub fn move_target(&self, function: &str) -> String {
        format!("{}::{}::{}", self.package_id, GAME_MODULE, function)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rpc_url.is_empty() {
            return Err(RpsError::config("RPC URL cannot be empty"));
        }

        if matches!(&self.wallet_url, Some(url) if url.is_empty()) {
            return Err(RpsError::config("Wallet URL cannot be empty"));
        }

        if self.gas_budget == 0 {
            return Err(RpsError::config("Gas budget must be greater than 0"));
        }

        if self.page_size == 0 {
            return Err(RpsError::config("Page size must be greater than 0"));
        }

        if self.schema == ChallengeSchema::Owned && self.treasury_cap_id.is_none() {
            return Err(RpsError::config(
                "The owned challenge schema needs a treasury capability id",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.known_addresses.len(), 2);
        assert_eq!(config.rpc_url, "https://fullnode.devnet.sui.io:443");
        assert!(config.coin_type().ends_with("::rps_token::RPS_TOKEN"));
        assert_eq!(
            config.move_target("join_challenge"),
            format!("{}::rps_game::join_challenge", DEFAULT_PACKAGE_ID)
        );
    }

    #[test]
    fn test_network_selection() {
        let config = ClientConfig::new(Network::Testnet);
        assert_eq!(config.rpc_url, "https://fullnode.testnet.sui.io:443");
        assert_eq!("LOCAL".parse::<Network>().unwrap(), Network::Localnet);
        assert!("moon".parse::<Network>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_config() {
        let mut config = ClientConfig::default();
        config.gas_budget = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.schema = ChallengeSchema::Owned;
        config.treasury_cap_id = None;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.wallet_url = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json_roundtrip_keeps_ids() {
        let config = ClientConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.package_id, config.package_id);
        assert_eq!(parsed.schema, ChallengeSchema::Shared);
    }
}
