use crate::challenge::Challenge;
use chrono::{Local, TimeZone};
use rps_core::{format_units, Address, ObjectId};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChallengeStatus {
    /// No opponent yet.
    Waiting,
    /// Opponent joined; resolution is up to the contract.
    Ready,
    Completed,
}

impl ChallengeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ChallengeStatus::Waiting => "Waiting for opponent",
            ChallengeStatus::Ready => "Battle ready",
            ChallengeStatus::Completed => "Completed",
        }
    }
}

/// Control offered next to a lobby entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LobbyAction {
    Join,
    Cancel,
}

#[derive(Debug, Clone, Serialize)]
pub struct LobbyEntry {
    pub position: usize,
    pub challenge: Challenge,
    pub is_mine: bool,
    pub status: ChallengeStatus,
    pub action: Option<LobbyAction>,
}

impl LobbyEntry {
    fn new(position: usize, challenge: &Challenge, account: Option<&Address>) -> Self {
        let is_mine = account.map_or(false, |a| challenge.is_created_by(a));
        let status = if challenge.is_completed {
            ChallengeStatus::Completed
        } else if challenge.opponent.is_some() {
            ChallengeStatus::Ready
        } else {
            ChallengeStatus::Waiting
        };

        let action = match (status, is_mine, account) {
            (ChallengeStatus::Waiting, true, _) => Some(LobbyAction::Cancel),
            (ChallengeStatus::Waiting, false, Some(_)) => Some(LobbyAction::Join),
            _ => None,
        };

        Self {
            position,
            challenge: challenge.clone(),
            is_mine,
            status,
            action,
        }
    }

    pub fn creator_display(&self) -> String {
        truncate_address(self.challenge.creator.as_str())
    }

    pub fn id_display(&self) -> String {
        truncate_id(self.challenge.id.as_str())
    }

    pub fn stake_display(&self) -> String {
        format_units(self.challenge.stake_amount)
    }

    pub fn created_display(&self) -> String {
        format_timestamp(self.challenge.created_at_ms)
    }
}

/// Derived, never stored, view of the lobby for one account.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LobbyView {
    pub entries: Vec<LobbyEntry>,
}

impl LobbyView {
    /// Lobby as players see it: completed challenges are left out.
    pub fn build(challenges: &[Challenge], account: Option<&Address>) -> Self {
        Self::collect(challenges.iter().filter(|c| !c.is_completed), account)
    }

    /// Every decoded challenge, completed ones included.
    pub fn build_all(challenges: &[Challenge], account: Option<&Address>) -> Self {
        Self::collect(challenges.iter(), account)
    }

    fn collect<'a>(
        challenges: impl Iterator<Item = &'a Challenge>,
        account: Option<&Address>,
    ) -> Self {
        let entries = challenges
            .enumerate()
            .map(|(i, c)| LobbyEntry::new(i + 1, c, account))
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn find(&self, id: &ObjectId) -> Option<&LobbyEntry> {
        self.entries.iter().find(|e| &e.challenge.id == id)
    }

    pub fn joinable(&self) -> impl Iterator<Item = &LobbyEntry> {
        self.entries
            .iter()
            .filter(|e| e.action == Some(LobbyAction::Join))
    }

    pub fn cancellable(&self) -> impl Iterator<Item = &LobbyEntry> {
        self.entries
            .iter()
            .filter(|e| e.action == Some(LobbyAction::Cancel))
    }
}

/// `0x4b7a...feec`
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// First ten characters of an object id.
pub fn truncate_id(id: &str) -> String {
    let head: String = id.chars().take(10).collect();
    if head.len() < id.len() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Epoch milliseconds as a local date-time.
pub fn format_timestamp(epoch_ms: u64) -> String {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Invalid date".to_string())
}
