use rps_core::types::value_as_u64;
use rps_core::{Address, ObjectId, ObjectResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A lobby entry as currently stored on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ObjectId,
    pub creator: Address,
    pub stake_amount: u64,
    pub opponent: Option<Address>,
    pub is_completed: bool,
    pub created_at_ms: u64,
}

impl Challenge {
    pub fn is_open(&self) -> bool {
        self.opponent.is_none() && !self.is_completed
    }

    pub fn is_created_by(&self, account: &Address) -> bool {
        &self.creator == account
    }

    /// Decode a challenge object from either known contract layout.
    ///
    /// Returns `None` for anything that cannot be shown safely: lookup
    /// errors, objects without content, or missing id, creator or stake.
    pub fn from_object(object: &ObjectResponse) -> Option<Self> {
        if object.error.is_some() {
            return None;
        }

        let id = object.object_id()?;
        let fields = object.fields()?;

        // shared objects carry the creator; owned ones are keyed by owner
        let creator = match fields.get("creator") {
            Some(Value::String(s)) => Address::parse(s).ok()?,
            Some(_) => return None,
            None => object.address_owner()?,
        };

        let stake_amount = decode_stake(fields)?;
        let opponent = decode_optional_address(fields.get("opponent"))?;

        let is_completed = match fields.get("is_completed") {
            Some(Value::Bool(b)) => *b,
            None | Some(Value::Null) => false,
            Some(_) => return None,
        };

        let created_at_ms = fields.get("created_at").and_then(value_as_u64).unwrap_or(0);

        Some(Self {
            id,
            creator,
            stake_amount,
            opponent,
            is_completed,
            created_at_ms,
        })
    }
}

fn decode_stake(fields: &Value) -> Option<u64> {
    if let Some(amount) = fields.get("stake_amount") {
        return value_as_u64(amount);
    }

    match fields.get("stake")? {
        // Balance<T> / Coin<T> rendered as a nested struct
        Value::Object(inner) => inner
            .get("fields")
            .and_then(|f| f.get("balance").or_else(|| f.get("value")))
            .or_else(|| inner.get("balance"))
            .and_then(value_as_u64),
        other => value_as_u64(other),
    }
}

/// `Ok(None)`-style decoding of `Option<address>`, where the outer `None`
/// means malformed.
fn decode_optional_address(value: Option<&Value>) -> Option<Option<Address>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) if s.is_empty() => Some(None),
        Some(Value::String(s)) => Address::parse(s).ok().map(Some),
        Some(Value::Object(inner)) => match inner.get("vec") {
            Some(Value::Array(items)) if items.is_empty() => Some(None),
            Some(Value::Array(items)) => items
                .first()
                .and_then(|v| v.as_str())
                .and_then(|s| Address::parse(s).ok())
                .map(Some),
            _ => None,
        },
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> ObjectResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_shared_layout() {
        let obj = object(json!({
            "data": {
                "objectId": "0xc1",
                "owner": { "Shared": { "initial_shared_version": 3 } },
                "content": {
                    "dataType": "moveObject",
                    "fields": {
                        "id": { "id": "0xc1" },
                        "creator": "0xa1",
                        "stake_amount": "300",
                        "opponent": null,
                        "is_completed": false,
                        "created_at": "1700000000000"
                    }
                }
            }
        }));

        let challenge = Challenge::from_object(&obj).unwrap();
        assert_eq!(challenge.id, ObjectId::parse("0xc1").unwrap());
        assert_eq!(challenge.creator, Address::parse("0xa1").unwrap());
        assert_eq!(challenge.stake_amount, 300);
        assert!(challenge.is_open());
        assert_eq!(challenge.created_at_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_decode_owned_layout() {
        let obj = object(json!({
            "data": {
                "objectId": "0xc2",
                "owner": { "AddressOwner": "0xb2" },
                "content": {
                    "fields": {
                        "stake": { "type": "0x2::balance::Balance", "fields": { "balance": "150" } },
                        "opponent": "0xb3",
                        "created_at": 5
                    }
                }
            }
        }));

        let challenge = Challenge::from_object(&obj).unwrap();
        assert_eq!(challenge.creator, Address::parse("0xb2").unwrap());
        assert_eq!(challenge.stake_amount, 150);
        assert_eq!(challenge.opponent, Some(Address::parse("0xb3").unwrap()));
        assert!(!challenge.is_completed);
        assert!(!challenge.is_open());
    }

    #[test]
    fn test_decode_option_vec_opponent() {
        let with = |opponent: Value| {
            object(json!({
                "data": {
                    "objectId": "0xc3",
                    "content": { "fields": {
                        "creator": "0xa1",
                        "stake_amount": 1,
                        "opponent": opponent
                    }}
                }
            }))
        };

        let none = Challenge::from_object(&with(json!({ "vec": [] }))).unwrap();
        assert!(none.opponent.is_none());

        let some = Challenge::from_object(&with(json!({ "vec": ["0xa2"] }))).unwrap();
        assert_eq!(some.opponent, Some(Address::parse("0xa2").unwrap()));
    }

    #[test]
    fn test_skips_malformed_records() {
        let cases = vec![
            json!({ "error": { "code": "notExists" } }),
            json!({ "data": { "objectId": "0xc4" } }),
            json!({ "data": { "content": { "fields": { "creator": "0xa1", "stake_amount": 1 } } } }),
            json!({ "data": { "objectId": "0xc4", "content": { "fields": { "stake_amount": 1 } } } }),
            json!({ "data": { "objectId": "0xc4", "content": { "fields": { "creator": "0xa1" } } } }),
            json!({ "data": { "objectId": "0xc4", "content": { "fields": {
                "creator": "0xa1", "stake_amount": "lots"
            } } } }),
            json!({ "data": { "objectId": "0xc4", "content": { "fields": {
                "creator": "0xa1", "stake_amount": 1, "opponent": "nonsense"
            } } } }),
            json!({ "data": { "objectId": "0xc4", "content": { "fields": {
                "creator": "0xa1", "stake_amount": 1, "is_completed": "yes"
            } } } }),
        ];

        for case in cases {
            assert!(
                Challenge::from_object(&object(case.clone())).is_none(),
                "decoded {}",
                case
            );
        }
    }
}
