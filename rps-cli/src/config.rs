use anyhow::{Context, Result};
use rps_core::{Address, ChallengeSchema, ClientConfig, Network, ObjectId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Settings persisted in `<data_dir>/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub network: Network,
    pub rpc_url: Option<String>,
    pub package_id: Option<String>,
    pub schema: ChallengeSchema,
    pub wallet_url: Option<String>,
    /// Account to browse as when no wallet provider is configured.
    pub account: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            network: Network::Devnet,
            rpc_url: None,
            package_id: None,
            schema: ChallengeSchema::Shared,
            wallet_url: None,
            account: None,
        }
    }
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub network: Option<String>,
    pub rpc_url: Option<String>,
    pub package_id: Option<String>,
    pub schema: Option<String>,
    pub wallet_url: Option<String>,
    pub account: Option<String>,
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rps")
}

impl CliConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(CONFIG_FILE)
    }

    /// Load the config file, or defaults when there is none yet.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = Self::path(data_dir);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(Self::default());
        }

        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub async fn save(&self, data_dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(data_dir).await?;
        let path = Self::path(data_dir);
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(network) = overrides.network {
            self.network = network.parse()?;
        }
        if let Some(schema) = overrides.schema {
            self.schema = schema.parse()?;
        }
        if overrides.rpc_url.is_some() {
            self.rpc_url = overrides.rpc_url;
        }
        if overrides.package_id.is_some() {
            self.package_id = overrides.package_id;
        }
        if overrides.wallet_url.is_some() {
            self.wallet_url = overrides.wallet_url;
        }
        if overrides.account.is_some() {
            self.account = overrides.account;
        }
        Ok(())
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(self.network);
        config.schema = self.schema;

        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(id) = &self.package_id {
            config.package_id = ObjectId::parse(id)?;
        }
        config.wallet_url = self.wallet_url.clone();

        config.validate()?;
        Ok(config)
    }

    pub fn account(&self) -> Result<Option<Address>> {
        match self.account.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Ok(Some(Address::parse(raw)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::load(dir.path()).await.unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = CliConfig::default();
        config.network = Network::Testnet;
        config.wallet_url = Some("http://127.0.0.1:9100".to_string());

        let path = config.save(dir.path()).await.unwrap();
        assert!(path.ends_with("config.json"));
        assert_eq!(CliConfig::load(dir.path()).await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(CliConfig::path(dir.path()), r#"{"schema":"owned"}"#)
            .await
            .unwrap();

        let config = CliConfig::load(dir.path()).await.unwrap();
        assert_eq!(config.schema, ChallengeSchema::Owned);
        assert_eq!(config.network, Network::Devnet);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = CliConfig::default();
        config
            .apply(Overrides {
                network: Some("local".to_string()),
                schema: Some("legacy".to_string()),
                account: Some("0xa1".to_string()),
                ..Overrides::default()
            })
            .unwrap();

        let client = config.client_config().unwrap();
        assert_eq!(client.network, Network::Localnet);
        assert_eq!(client.rpc_url, "http://127.0.0.1:9000");
        assert_eq!(client.schema, ChallengeSchema::Owned);
        assert_eq!(config.account().unwrap(), Some(Address::parse("0xa1").unwrap()));
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = CliConfig::default();
        assert!(config
            .apply(Overrides {
                network: Some("moonnet".to_string()),
                ..Overrides::default()
            })
            .is_err());

        config.package_id = Some("not-an-id".to_string());
        assert!(config.client_config().is_err());

        config.package_id = None;
        config.account = Some("0xzz".to_string());
        assert!(config.account().is_err());
    }
}
