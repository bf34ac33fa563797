use crate::config::ClientConfig;
use crate::error::{Result, RpsError};
use crate::ledger::{EventRecord, LedgerReader, ObjectResponse, Page, MULTI_GET_LIMIT};
use crate::types::{Address, CoinObject, ObjectId, TokenBalance};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// JSON-RPC client for a ledger full node.
pub struct LedgerClient {
    http: reqwest::Client,
    rpc_url: String,
    page_size: usize,
    next_id: AtomicU64,
}

fn object_options() -> Value {
    json!({
        "showContent": true,
        "showType": true,
        "showOwner": true
    })
}

impl LedgerClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                RpsError::network_connection(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            page_size: config.page_size,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!("RPC {} (id {})", method, id);

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpsError::network_connection(format!("{} failed: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(RpsError::rpc(format!(
                "{} returned HTTP {}",
                method,
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| RpsError::rpc(format!("Invalid JSON from {}: {}", method, e)))?;

        extract_result(method, payload)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let result = self.rpc_call(method, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Walk every page of a cursor-paginated method.
    ///
    /// `params` builds the parameter list from the current cursor.
    async fn collect_pages<T, F>(&self, method: &str, params: F) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(Value) -> Value,
    {
        let mut items = Vec::new();
        let mut cursor = Value::Null;

        loop {
            let page: Page<T> = self.call(method, params(cursor.clone())).await?;
            let next = advance_cursor(&cursor, page.has_next_page, page.next_cursor);
            items.extend(page.data);

            match next {
                Some(next) => cursor = next,
                None => break,
            }
        }

        Ok(items)
    }
}

/// Cursor for the next request, or `None` once paging is done. A node that
/// hands back the cursor it was given would loop forever, so that stops too.
fn advance_cursor(current: &Value, has_next_page: bool, next: Option<Value>) -> Option<Value> {
    match next {
        Some(next) if has_next_page && !next.is_null() && &next != current => Some(next),
        _ => None,
    }
}

/// Id batches for `sui_multiGetObjects`.
fn id_batches(ids: &[ObjectId]) -> std::slice::Chunks<'_, ObjectId> {
    ids.chunks(MULTI_GET_LIMIT)
}

fn extract_result(method: &str, mut payload: Value) -> Result<Value> {
    if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(RpsError::rpc(format!("{}: {}", method, message)));
    }

    match payload.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(RpsError::rpc(format!("{}: response has no result", method))),
    }
}

#[async_trait]
impl LedgerReader for LedgerClient {
    async fn get_balance(&self, owner: &Address, coin_type: &str) -> Result<TokenBalance> {
        self.call("suix_getBalance", json!([owner, coin_type])).await
    }

    async fn get_coins(&self, owner: &Address, coin_type: &str) -> Result<Vec<CoinObject>> {
        let limit = self.page_size;
        self.collect_pages("suix_getCoins", |cursor| {
            json!([owner, coin_type, cursor, limit])
        })
        .await
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectResponse> {
        self.call("sui_getObject", json!([id, object_options()]))
            .await
    }

    async fn multi_get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectResponse>> {
        let mut objects = Vec::with_capacity(ids.len());
        for chunk in id_batches(ids) {
            let batch: Vec<ObjectResponse> = self
                .call("sui_multiGetObjects", json!([chunk, object_options()]))
                .await?;
            objects.extend(batch);
        }
        Ok(objects)
    }

    async fn get_owned_objects(
        &self,
        owner: &Address,
        struct_type: &str,
    ) -> Result<Vec<ObjectResponse>> {
        let limit = self.page_size;
        self.collect_pages("suix_getOwnedObjects", |cursor| {
            json!([
                owner,
                {
                    "filter": { "StructType": struct_type },
                    "options": object_options()
                },
                cursor,
                limit
            ])
        })
        .await
    }

    async fn query_events(&self, event_type: &str) -> Result<Vec<EventRecord>> {
        let limit = self.page_size;
        self.collect_pages("suix_queryEvents", |cursor| {
            json!([{ "MoveEventType": event_type }, cursor, limit, false])
        })
        .await
    }
}
