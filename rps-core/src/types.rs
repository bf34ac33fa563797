use crate::error::{Result, RpsError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of hex digits in a full ledger identifier (32 bytes).
const ID_HEX_LEN: usize = 64;

fn normalize_hex_id(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if body.is_empty() || body.len() > ID_HEX_LEN {
        return Err(RpsError::InvalidAddress(input.to_string()));
    }

    let padded = format!("{:0>width$}", body.to_ascii_lowercase(), width = ID_HEX_LEN);
    hex::decode(&padded).map_err(|e| RpsError::InvalidAddress(format!("{}: {}", input, e)))?;

    Ok(format!("0x{}", padded))
}

macro_rules! hex_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn parse(input: &str) -> Result<Self> {
                normalize_hex_id(input).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// For compile-time constants already in canonical form.
            pub(crate) fn from_canonical(canonical: &str) -> Self {
                debug_assert!(canonical.len() == ID_HEX_LEN + 2);
                Self(canonical.to_string())
            }
        }

        impl FromStr for $name {
            type Err = RpsError;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = RpsError;

            fn try_from(value: String) -> Result<Self> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

hex_identifier!(
    /// Account address on the ledger, always stored as `0x` + 64 lowercase hex digits.
    Address
);

hex_identifier!(
    /// Identifier of an on-ledger object (coin, challenge, package).
    ObjectId
);

/// Ledger quantities arrive as decimal strings; older nodes send bare numbers.
pub(crate) fn de_u64_lenient<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Read a u64 out of a loosely-typed JSON value.
pub fn value_as_u64(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub coin_type: String,
    #[serde(deserialize_with = "de_u64_lenient")]
    pub coin_object_count: u64,
    #[serde(deserialize_with = "de_u64_lenient")]
    pub total_balance: u64,
}

impl TokenBalance {
    pub fn zero(coin_type: impl Into<String>) -> Self {
        Self {
            coin_type: coin_type.into(),
            coin_object_count: 0,
            total_balance: 0,
        }
    }
}

/// A discrete holding of the game token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub coin_object_id: ObjectId,
    #[serde(default, deserialize_with = "de_u64_lenient")]
    pub version: u64,
    #[serde(default)]
    pub digest: String,
    #[serde(deserialize_with = "de_u64_lenient")]
    pub balance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

/// Outcome of a transaction executed through the wallet provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub digest: String,
    pub status: ExecutionStatus,
    pub executed_at: DateTime<Utc>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, ExecutionStatus::Success)
    }
}
