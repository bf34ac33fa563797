//! In-memory ledger and wallet used by the unit tests.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rps_core::ledger::{EventId, EventRecord};
use rps_core::types::ExecutionStatus;
use rps_core::{
    Address, CoinObject, ExecutionResult, LedgerReader, ObjectId, ObjectResponse, Result,
    RpsError, TokenBalance, TransactionRequest, WalletProvider,
};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub fn challenge_object(
    id: &str,
    creator: &str,
    stake: u64,
    opponent: Option<&str>,
    completed: bool,
) -> ObjectResponse {
    object_from(json!({
        "data": {
            "objectId": id,
            "owner": { "Shared": { "initial_shared_version": 1 } },
            "content": {
                "dataType": "moveObject",
                "fields": {
                    "creator": creator,
                    "stake_amount": stake.to_string(),
                    "opponent": opponent,
                    "is_completed": completed,
                    "created_at": "1700000000000"
                }
            }
        }
    }))
}

pub fn owned_challenge_object(id: &str, owner: &str, stake: u64) -> ObjectResponse {
    object_from(json!({
        "data": {
            "objectId": id,
            "owner": { "AddressOwner": owner },
            "content": {
                "dataType": "moveObject",
                "fields": {
                    "stake": { "fields": { "balance": stake.to_string() } },
                    "opponent": null,
                    "created_at": "1700000000000"
                }
            }
        }
    }))
}

fn object_from(value: Value) -> ObjectResponse {
    serde_json::from_value(value).expect("valid object fixture")
}

pub fn coin(id: &str, balance: u64) -> CoinObject {
    CoinObject {
        coin_object_id: ObjectId::parse(id).expect("valid coin id"),
        version: 1,
        digest: "digest".to_string(),
        balance,
    }
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<Address, u64>,
    coins: HashMap<Address, Vec<CoinObject>>,
    owned: HashMap<Address, Vec<ObjectResponse>>,
    objects: HashMap<ObjectId, ObjectResponse>,
    events: Vec<EventRecord>,
    package_exists: bool,
    failing_owned: HashSet<Address>,
    owned_queries: HashMap<Address, usize>,
    multi_get_calls: usize,
    log: Vec<String>,
}

#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<LedgerState>,
}

impl FakeLedger {
    pub fn new() -> Self {
        let ledger = Self::default();
        ledger.state.lock().package_exists = true;
        ledger
    }

    pub fn set_balance(&self, owner: &Address, amount: u64) {
        self.state.lock().balances.insert(owner.clone(), amount);
    }

    pub fn set_coins(&self, owner: &Address, coins: Vec<CoinObject>) {
        self.state.lock().coins.insert(owner.clone(), coins);
    }

    pub fn set_package_exists(&self, exists: bool) {
        self.state.lock().package_exists = exists;
    }

    pub fn add_owned(&self, owner: &Address, object: ObjectResponse) {
        self.state
            .lock()
            .owned
            .entry(owner.clone())
            .or_default()
            .push(object);
    }

    pub fn fail_owned_for(&self, owner: &Address) {
        self.state.lock().failing_owned.insert(owner.clone());
    }

    pub fn add_challenge(&self, object: ObjectResponse) {
        let id = object.object_id().expect("fixture has an id");
        self.state.lock().objects.insert(id, object);
    }

    pub fn add_event(&self, challenge_id: &str) {
        let mut state = self.state.lock();
        let seq = state.events.len();
        state.events.push(EventRecord {
            id: EventId {
                tx_digest: format!("tx{}", seq),
                event_seq: "0".to_string(),
            },
            event_type: "0xa::rps_game::ChallengeCreated".to_string(),
            sender: None,
            parsed_json: json!({ "challenge_id": challenge_id }),
            timestamp_ms: None,
        });
    }

    pub fn owned_queries(&self, owner: &Address) -> usize {
        self.state
            .lock()
            .owned_queries
            .get(owner)
            .copied()
            .unwrap_or(0)
    }

    pub fn multi_get_calls(&self) -> usize {
        self.state.lock().multi_get_calls
    }

    /// Names of the read calls made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().log.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().log.clear();
    }
}

#[async_trait]
impl LedgerReader for FakeLedger {
    async fn get_balance(&self, owner: &Address, coin_type: &str) -> Result<TokenBalance> {
        let mut state = self.state.lock();
        state.log.push("get_balance".to_string());
        let total = state.balances.get(owner).copied().unwrap_or(0);
        let count = state.coins.get(owner).map(|c| c.len()).unwrap_or(0) as u64;
        Ok(TokenBalance {
            coin_type: coin_type.to_string(),
            coin_object_count: count,
            total_balance: total,
        })
    }

    async fn get_coins(&self, owner: &Address, _coin_type: &str) -> Result<Vec<CoinObject>> {
        let mut state = self.state.lock();
        state.log.push("get_coins".to_string());
        Ok(state.coins.get(owner).cloned().unwrap_or_default())
    }

    async fn get_object(&self, id: &ObjectId) -> Result<ObjectResponse> {
        let mut state = self.state.lock();
        state.log.push("get_object".to_string());
        if state.package_exists {
            Ok(object_from(json!({ "data": { "objectId": id.as_str() } })))
        } else {
            Ok(object_from(json!({ "error": { "code": "notExists" } })))
        }
    }

    async fn multi_get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectResponse>> {
        let mut state = self.state.lock();
        state.log.push("multi_get_objects".to_string());
        state.multi_get_calls += 1;
        Ok(ids
            .iter()
            .map(|id| {
                state
                    .objects
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| object_from(json!({ "error": { "code": "notExists" } })))
            })
            .collect())
    }

    async fn get_owned_objects(
        &self,
        owner: &Address,
        _struct_type: &str,
    ) -> Result<Vec<ObjectResponse>> {
        let mut state = self.state.lock();
        state.log.push("get_owned_objects".to_string());
        *state.owned_queries.entry(owner.clone()).or_default() += 1;
        if state.failing_owned.contains(owner) {
            return Err(RpsError::rpc("owned object scan failed"));
        }
        Ok(state.owned.get(owner).cloned().unwrap_or_default())
    }

    async fn query_events(&self, _event_type: &str) -> Result<Vec<EventRecord>> {
        let mut state = self.state.lock();
        state.log.push("query_events".to_string());
        Ok(state.events.clone())
    }
}

/// Wallet that records what it is asked to sign.
pub struct FakeWallet {
    account: Mutex<Option<Address>>,
    submitted: Mutex<Vec<TransactionRequest>>,
    failure: Mutex<Option<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeWallet {
    pub fn new(account: Option<Address>) -> Self {
        Self {
            account: Mutex::new(account),
            submitted: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            gate: None,
        }
    }

    /// Signing blocks until [`FakeWallet::release`] is called.
    pub fn gated(account: Option<Address>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(account)
        }
    }

    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    pub fn switch_account(&self, account: Option<Address>) {
        *self.account.lock() = account;
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn submitted(&self) -> Vec<TransactionRequest> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn current_account(&self) -> Result<Option<Address>> {
        Ok(self.account.lock().clone())
    }

    async fn sign_and_execute(&self, tx: &TransactionRequest) -> Result<ExecutionResult> {
        self.submitted.lock().push(tx.clone());

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| RpsError::wallet(e.to_string()))?;
            permit.forget();
        }

        if let Some(message) = self.failure.lock().clone() {
            return Err(RpsError::wallet(message));
        }

        Ok(ExecutionResult {
            digest: format!("digest-{}", self.submitted.lock().len()),
            status: ExecutionStatus::Success,
            executed_at: Utc::now(),
        })
    }

    fn select_account(&self, account: Option<Address>) -> Result<()> {
        self.switch_account(account);
        Ok(())
    }
}
