use rps_core::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// What an in-flight action is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKey {
    Create,
    Join(ObjectId),
    Cancel(ObjectId),
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKey::Create => write!(f, "create challenge"),
            ActionKey::Join(id) => write!(f, "join {}", id),
            ActionKey::Cancel(id) => write!(f, "cancel {}", id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionStatus {
    Idle,
    Pending,
    Succeeded { digest: String },
    Failed { message: String },
}

#[derive(Debug, Clone)]
struct ActionRecord {
    invocation: Uuid,
    status: ActionStatus,
}

/// Per-key action state. Only the pending marker of a key blocks that same
/// key; other keys proceed independently.
#[derive(Debug, Clone, Default)]
pub struct ActionTracker {
    records: HashMap<ActionKey, ActionRecord>,
}

impl ActionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, key: &ActionKey) -> ActionStatus {
        self.records
            .get(key)
            .map(|r| r.status.clone())
            .unwrap_or(ActionStatus::Idle)
    }

    pub fn is_pending(&self, key: &ActionKey) -> bool {
        matches!(self.status(key), ActionStatus::Pending)
    }

    /// Mark `key` pending. Returns the invocation id, or `None` if that key
    /// is already in flight.
    pub fn begin(&mut self, key: ActionKey) -> Option<Uuid> {
        if self.is_pending(&key) {
            return None;
        }

        let invocation = Uuid::new_v4();
        self.records.insert(
            key,
            ActionRecord {
                invocation,
                status: ActionStatus::Pending,
            },
        );
        Some(invocation)
    }

    /// Settle an invocation. Ignored when the tracker was reset since
    /// [`ActionTracker::begin`], so stale completions cannot touch new state.
    pub fn finish(&mut self, key: &ActionKey, invocation: Uuid, status: ActionStatus) -> bool {
        match self.records.get_mut(key) {
            Some(record) if record.invocation == invocation => {
                record.status = status;
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> Vec<ActionKey> {
        self.records
            .iter()
            .filter(|(_, r)| r.status == ActionStatus::Pending)
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }
}
