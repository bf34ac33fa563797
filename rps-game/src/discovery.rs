//! Finding challenges on the ledger.
//!
//! Two strategies exist because the contract changed shape: the owned-object
//! contract can only be scanned per owner, while the shared-object contract
//! announces every challenge with a `ChallengeCreated` event.

use crate::challenge::Challenge;
use futures::future::join_all;
use rps_core::{
    Address, ChallengeSchema, ClientConfig, LedgerReader, ObjectId, ObjectResponse, Result,
};
use std::collections::HashSet;
use std::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// Scan challenge objects owned by the account and a fixed list of known players.
    OwnedScan { known_addresses: Vec<Address> },
    /// Replay creation events and load each announced challenge.
    EventReplay,
}

impl DiscoveryStrategy {
    pub fn for_config(config: &ClientConfig) -> Self {
        match config.schema {
            ChallengeSchema::Owned => DiscoveryStrategy::OwnedScan {
                known_addresses: config.known_addresses.clone(),
            },
            ChallengeSchema::Shared => DiscoveryStrategy::EventReplay,
        }
    }

    pub async fn discover(
        &self,
        reader: &dyn LedgerReader,
        config: &ClientConfig,
        account: &Address,
    ) -> Result<Vec<Challenge>> {
        let challenges = match self {
            DiscoveryStrategy::OwnedScan { known_addresses } => {
                scan_owned(reader, config, account, known_addresses).await?
            }
            DiscoveryStrategy::EventReplay => replay_events(reader, config).await?,
        };

        tracing::debug!("Discovered {} challenge(s)", challenges.len());
        Ok(challenges)
    }
}

/// Keep the first item for each key, in original order. Items without a key
/// are dropped.
pub fn dedup_by_key<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> Option<K>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| match key(item) {
            Some(k) => seen.insert(k),
            None => false,
        })
        .collect()
}

fn decode_all(objects: Vec<ObjectResponse>) -> Vec<Challenge> {
    objects
        .iter()
        .filter_map(|obj| {
            let decoded = Challenge::from_object(obj);
            if decoded.is_none() {
                tracing::debug!("Skipping unreadable challenge object {:?}", obj.object_id());
            }
            decoded
        })
        .collect()
}

async fn scan_owned(
    reader: &dyn LedgerReader,
    config: &ClientConfig,
    account: &Address,
    known_addresses: &[Address],
) -> Result<Vec<Challenge>> {
    let struct_type = config.challenge_type();

    let mut owners = vec![account.clone()];
    for address in known_addresses {
        if !owners.contains(address) {
            owners.push(address.clone());
        }
    }

    let results = join_all(
        owners
            .iter()
            .map(|owner| reader.get_owned_objects(owner, &struct_type)),
    )
    .await;

    let mut combined = Vec::new();
    for (owner, result) in owners.iter().zip(results) {
        match result {
            Ok(objects) => combined.extend(objects),
            // the account's own challenges are required; other players' are best effort
            Err(e) if owner == account => return Err(e),
            Err(e) => tracing::warn!("Could not scan challenges of {}: {}", owner, e),
        }
    }

    let unique = dedup_by_key(combined, |obj: &ObjectResponse| obj.object_id());
    Ok(decode_all(unique))
}

async fn replay_events(
    reader: &dyn LedgerReader,
    config: &ClientConfig,
) -> Result<Vec<Challenge>> {
    let events = reader
        .query_events(&config.challenge_created_event())
        .await?;

    let ids: Vec<ObjectId> = events
        .iter()
        .filter_map(|event| {
            event
                .parsed_json
                .get("challenge_id")
                .and_then(|v| v.as_str())
                .and_then(|id| ObjectId::parse(id).ok())
        })
        .collect();
    let ids = dedup_by_key(ids, |id| Some(id.clone()));

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let objects = reader.multi_get_objects(&ids).await?;
    Ok(decode_all(objects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{challenge_object, owned_challenge_object, FakeLedger};
    use rps_core::RpsError;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let items = vec![("b", 1), ("a", 2), ("b", 3), ("c", 4), ("a", 5)];
        let unique = dedup_by_key(items, |(k, _)| Some(*k));
        assert_eq!(unique, vec![("b", 1), ("a", 2), ("c", 4)]);
    }

    #[test]
    fn test_dedup_drops_keyless_items() {
        let items = vec![Some(1), None, Some(1), Some(2), None];
        let unique = dedup_by_key(items, |v| *v);
        assert_eq!(unique, vec![Some(1), Some(2)]);
    }

    #[tokio::test]
    async fn test_owned_scan_merges_and_dedups() {
        let me = addr("0xa1");
        let other = addr("0xb1");
        let ledger = FakeLedger::new();
        ledger.add_owned(&me, owned_challenge_object("0xc1", "0xa1", 100));
        ledger.add_owned(&other, owned_challenge_object("0xc2", "0xb1", 200));
        // the same object seen through two owners
        ledger.add_owned(&other, owned_challenge_object("0xc1", "0xa1", 100));

        let mut config = ClientConfig::default();
        config.schema = ChallengeSchema::Owned;
        config.known_addresses = vec![other.clone(), me.clone()];

        let strategy = DiscoveryStrategy::for_config(&config);
        let found = strategy.discover(&ledger, &config, &me).await.unwrap();

        let ids: Vec<_> = found.iter().map(|c| c.id.clone()).collect();
        assert_eq!(
            ids,
            vec![ObjectId::parse("0xc1").unwrap(), ObjectId::parse("0xc2").unwrap()]
        );
        // the account appears in the known list but is scanned once
        assert_eq!(ledger.owned_queries(&me), 1);
    }

    #[tokio::test]
    async fn test_owned_scan_tolerates_failing_known_address() {
        let me = addr("0xa1");
        let other = addr("0xb1");
        let ledger = FakeLedger::new();
        ledger.add_owned(&me, owned_challenge_object("0xc1", "0xa1", 100));
        ledger.fail_owned_for(&other);

        let mut config = ClientConfig::default();
        config.schema = ChallengeSchema::Owned;
        config.known_addresses = vec![other];

        let found = DiscoveryStrategy::for_config(&config)
            .discover(&ledger, &config, &me)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);

        ledger.fail_owned_for(&me);
        let result = DiscoveryStrategy::for_config(&config)
            .discover(&ledger, &config, &me)
            .await;
        assert!(matches!(result, Err(RpsError::Rpc(_))));
    }

    #[tokio::test]
    async fn test_event_replay_finds_all_creators() {
        let ledger = FakeLedger::new();
        ledger.add_challenge(challenge_object("0xc1", "0xa1", 150, None, false));
        ledger.add_challenge(challenge_object("0xc2", "0xb1", 300, Some("0xa1"), false));
        ledger.add_event("0xc1");
        ledger.add_event("0xc2");
        ledger.add_event("0xc1");
        // announced but not yet indexed
        ledger.add_event("0xc9");

        let config = ClientConfig::default();
        let found = DiscoveryStrategy::EventReplay
            .discover(&ledger, &config, &addr("0xd1"))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].creator, addr("0xa1"));
        assert_eq!(found[1].opponent, Some(addr("0xa1")));
        assert_eq!(ledger.multi_get_calls(), 1);
    }

    #[tokio::test]
    async fn test_event_replay_without_events_skips_lookup() {
        let ledger = FakeLedger::new();
        let config = ClientConfig::default();
        let found = DiscoveryStrategy::EventReplay
            .discover(&ledger, &config, &addr("0xd1"))
            .await
            .unwrap();
        assert!(found.is_empty());
        assert_eq!(ledger.multi_get_calls(), 0);
    }
}
