use crate::error::{Result, RpsError};
use crate::transaction::TransactionRequest;
use crate::types::{Address, ExecutionResult, ExecutionStatus};
use crate::wallet::WalletProvider;
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Wallet provider reached over HTTP.
///
/// The endpoint exposes `GET /account` and `POST /sign-and-execute`. It owns
/// the keys and any user confirmation prompt, so signing requests are sent
/// without a client-side timeout.
pub struct RemoteWallet {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    digest: String,
    #[serde(default)]
    effects: Option<Effects>,
}

#[derive(Debug, Deserialize)]
struct Effects {
    status: EffectsStatus,
}

#[derive(Debug, Deserialize)]
struct EffectsStatus {
    status: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "message")]
    error: String,
}

impl RemoteWallet {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(RpsError::config("Wallet URL cannot be empty"));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                RpsError::network_connection(format!("Failed to create wallet client: {}", e))
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn error_message(response: reqwest::Response) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => format!("wallet returned HTTP {}", status),
        }
    }
}

fn execution_result(response: ExecuteResponse) -> ExecutionResult {
    let status = match response.effects {
        Some(effects) if effects.status.status != "success" => ExecutionStatus::Failure {
            error: effects
                .status
                .error
                .unwrap_or_else(|| effects.status.status.clone()),
        },
        _ => ExecutionStatus::Success,
    };

    ExecutionResult {
        digest: response.digest,
        status,
        executed_at: Utc::now(),
    }
}

#[async_trait]
impl WalletProvider for RemoteWallet {
    async fn current_account(&self) -> Result<Option<Address>> {
        let response = self
            .http
            .get(format!("{}/account", self.base_url))
            .send()
            .await
            .map_err(|e| RpsError::wallet(format!("Wallet unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(RpsError::wallet(Self::error_message(response).await));
        }

        let body: AccountResponse = response
            .json()
            .await
            .map_err(|e| RpsError::wallet(format!("Invalid account response: {}", e)))?;

        body.address.as_deref().map(Address::parse).transpose()
    }

    async fn sign_and_execute(&self, tx: &TransactionRequest) -> Result<ExecutionResult> {
        tracing::debug!(
            "Submitting transaction with {} command(s) to wallet",
            tx.commands.len()
        );

        let response = self
            .http
            .post(format!("{}/sign-and-execute", self.base_url))
            .json(&json!({
                "transaction": tx,
                "options": { "showEffects": true, "showObjectChanges": true }
            }))
            .send()
            .await
            .map_err(|e| RpsError::wallet(format!("Wallet unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(RpsError::wallet(Self::error_message(response).await));
        }

        let body: ExecuteResponse = response
            .json()
            .await
            .map_err(|e| RpsError::wallet(format!("Invalid execution response: {}", e)))?;

        let result = execution_result(body);
        if let ExecutionStatus::Failure { error } = &result.status {
            return Err(RpsError::wallet(format!(
                "Transaction {} failed: {}",
                result.digest, error
            )));
        }

        Ok(result)
    }
}
