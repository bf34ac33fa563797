pub mod client;

pub use client::LedgerClient;

use crate::error::Result;
use crate::types::{Address, CoinObject, ObjectId, TokenBalance};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Most ids a single multi-object lookup accepts.
pub const MULTI_GET_LIMIT: usize = 50;

/// One page of a cursor-paginated query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<serde_json::Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Object as returned by the ledger, kept loosely typed so that decoding a
/// challenge can skip malformed records instead of failing the whole query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default, rename = "type")]
    pub object_type: Option<String>,
    #[serde(default)]
    pub owner: Option<serde_json::Value>,
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl ObjectResponse {
    pub fn exists(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        self.data
            .as_ref()
            .and_then(|d| d.object_id.as_deref())
            .and_then(|id| ObjectId::parse(id).ok())
    }

    /// Move struct fields of the object, if content was requested and present.
    pub fn fields(&self) -> Option<&serde_json::Value> {
        self.data
            .as_ref()?
            .content
            .as_ref()?
            .get("fields")
            .filter(|f| f.is_object())
    }

    /// Address of the single owner, for address-owned objects.
    pub fn address_owner(&self) -> Option<Address> {
        self.data
            .as_ref()?
            .owner
            .as_ref()?
            .get("AddressOwner")?
            .as_str()
            .and_then(|a| Address::parse(a).ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: String,
    pub event_seq: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: EventId,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub parsed_json: serde_json::Value,
    #[serde(default)]
    pub timestamp_ms: Option<String>,
}

/// Read side of the ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn get_balance(&self, owner: &Address, coin_type: &str) -> Result<TokenBalance>;

    /// All coins of `coin_type` held by `owner`, across every page.
    async fn get_coins(&self, owner: &Address, coin_type: &str) -> Result<Vec<CoinObject>>;

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectResponse>;

    /// Current state of each id, in request order.
    async fn multi_get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectResponse>>;

    /// All objects of `struct_type` owned by `owner`, across every page.
    async fn get_owned_objects(
        &self,
        owner: &Address,
        struct_type: &str,
    ) -> Result<Vec<ObjectResponse>>;

    /// Every event of `event_type`, oldest first.
    async fn query_events(&self, event_type: &str) -> Result<Vec<EventRecord>>;
}
