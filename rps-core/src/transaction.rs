//! Locally built transaction requests.
//!
//! A request is an ordered list of inputs and commands, the same shape a
//! programmable transaction has on the ledger. It is handed to the wallet
//! provider for signing and never stored.

use crate::config::ClientConfig;
use crate::stake::StakeSource;
use crate::types::{Address, ObjectId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CallArg {
    Object { object_id: ObjectId },
    PureU64 { value: u64 },
}

/// Reference to a value inside the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Command {
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MoveCall {
        target: String,
        arguments: Vec<Argument>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub sender: Address,
    pub gas_budget: u64,
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl TransactionRequest {
    pub fn new(sender: Address, gas_budget: u64) -> Self {
        Self {
            sender,
            gas_budget,
            inputs: Vec::new(),
            commands: Vec::new(),
        }
    }

    fn push_input(&mut self, arg: CallArg) -> Argument {
        // identical object references share one input slot
        if let Some(pos) = self.inputs.iter().position(|existing| existing == &arg) {
            return Argument::Input(pos as u16);
        }
        self.inputs.push(arg);
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    pub fn object(&mut self, object_id: &ObjectId) -> Argument {
        self.push_input(CallArg::Object {
            object_id: object_id.clone(),
        })
    }

    pub fn pure_u64(&mut self, value: u64) -> Argument {
        self.inputs.push(CallArg::PureU64 { value });
        Argument::Input((self.inputs.len() - 1) as u16)
    }

    /// Split `amounts` off `coin`; returns one argument per produced coin.
    pub fn split_coins(&mut self, coin: Argument, amounts: &[u64]) -> Vec<Argument> {
        let amount_args: Vec<Argument> = amounts.iter().map(|a| self.pure_u64(*a)).collect();
        self.commands.push(Command::SplitCoins {
            coin,
            amounts: amount_args,
        });
        let idx = (self.commands.len() - 1) as u16;
        (0..amounts.len() as u16)
            .map(|i| Argument::NestedResult(idx, i))
            .collect()
    }

    pub fn move_call(&mut self, target: impl Into<String>, arguments: Vec<Argument>) -> Argument {
        self.commands.push(Command::MoveCall {
            target: target.into(),
            arguments,
        });
        Argument::Result((self.commands.len() - 1) as u16)
    }

    /// Materialize the stake input: the whole coin, or exactly one split.
    pub fn stake_argument(&mut self, source: &StakeSource) -> Argument {
        match source {
            StakeSource::Whole(coin) => self.object(&coin.coin_object_id),
            StakeSource::Split { coin, amount } => {
                let coin_arg = self.object(&coin.coin_object_id);
                self.split_coins(coin_arg, &[*amount])[0]
            }
        }
    }

    pub fn split_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::SplitCoins { .. }))
            .count()
    }

    pub fn move_calls(&self) -> impl Iterator<Item = (&str, &[Argument])> {
        self.commands.iter().filter_map(|c| match c {
            Command::MoveCall { target, arguments } => Some((target.as_str(), arguments.as_slice())),
            _ => None,
        })
    }

    pub fn input(&self, arg: Argument) -> Option<&CallArg> {
        match arg {
            Argument::Input(i) => self.inputs.get(i as usize),
            _ => None,
        }
    }
}

/// Contract entry points the client knows how to call.
pub mod calls {
    use super::*;

    pub const CREATE_CHALLENGE: &str = "create_challenge";
    pub const JOIN_CHALLENGE: &str = "join_challenge";
    pub const CANCEL_CHALLENGE: &str = "cancel_challenge";

    /// `create_challenge(stake_coin)` on the shared-object contract.
    pub fn create_challenge(
        config: &ClientConfig,
        sender: Address,
        stake: &StakeSource,
    ) -> TransactionRequest {
        let mut tx = TransactionRequest::new(sender, config.gas_budget);
        let stake_arg = tx.stake_argument(stake);
        tx.move_call(config.move_target(CREATE_CHALLENGE), vec![stake_arg]);
        tx
    }

    /// `create_challenge(treasury_cap, amount)` on the owned-object contract.
    pub fn create_challenge_legacy(
        config: &ClientConfig,
        sender: Address,
        treasury_cap: &ObjectId,
        amount: u64,
    ) -> TransactionRequest {
        let mut tx = TransactionRequest::new(sender, config.gas_budget);
        let cap = tx.object(treasury_cap);
        let amount = tx.pure_u64(amount);
        tx.move_call(config.move_target(CREATE_CHALLENGE), vec![cap, amount]);
        tx
    }

    pub fn join_challenge(
        config: &ClientConfig,
        sender: Address,
        challenge: &ObjectId,
        stake: &StakeSource,
    ) -> TransactionRequest {
        let mut tx = TransactionRequest::new(sender, config.gas_budget);
        let challenge_arg = tx.object(challenge);
        let stake_arg = tx.stake_argument(stake);
        tx.move_call(
            config.move_target(JOIN_CHALLENGE),
            vec![challenge_arg, stake_arg],
        );
        tx
    }

    pub fn cancel_challenge(
        config: &ClientConfig,
        sender: Address,
        challenge: &ObjectId,
    ) -> TransactionRequest {
        let mut tx = TransactionRequest::new(sender, config.gas_budget);
        let challenge_arg = tx.object(challenge);
        tx.move_call(config.move_target(CANCEL_CHALLENGE), vec![challenge_arg]);
        tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CoinObject;

    fn sender() -> Address {
        Address::parse("0xabc").unwrap()
    }

    fn coin(id: &str, balance: u64) -> CoinObject {
        CoinObject {
            coin_object_id: ObjectId::parse(id).unwrap(),
            version: 3,
            digest: "d".to_string(),
            balance,
        }
    }

    #[test]
    fn test_create_with_exact_coin() {
        let config = ClientConfig::default();
        let source = StakeSource::for_coin(&coin("0x11", 150), 150);
        let tx = calls::create_challenge(&config, sender(), &source);

        assert_eq!(tx.split_count(), 0);
        let calls: Vec<_> = tx.move_calls().collect();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.ends_with("::rps_game::create_challenge"));
        assert_eq!(calls[0].1.len(), 1);
        assert_eq!(
            tx.input(calls[0].1[0]),
            Some(&CallArg::Object {
                object_id: ObjectId::parse("0x11").unwrap()
            })
        );
    }

    #[test]
    fn test_join_splits_larger_coin() {
        let config = ClientConfig::default();
        let challenge = ObjectId::parse("0xc1").unwrap();
        let source = StakeSource::for_coin(&coin("0x22", 500), 300);
        let tx = calls::join_challenge(&config, sender(), &challenge, &source);

        assert_eq!(tx.split_count(), 1);
        match &tx.commands[0] {
            Command::SplitCoins { coin, amounts } => {
                assert_eq!(
                    tx.input(*coin),
                    Some(&CallArg::Object {
                        object_id: ObjectId::parse("0x22").unwrap()
                    })
                );
                assert_eq!(amounts.len(), 1);
                assert_eq!(tx.input(amounts[0]), Some(&CallArg::PureU64 { value: 300 }));
            }
            other => panic!("expected split, got {:?}", other),
        }

        let (target, args) = tx.move_calls().next().unwrap();
        assert!(target.ends_with("::rps_game::join_challenge"));
        assert_eq!(
            tx.input(args[0]),
            Some(&CallArg::Object {
                object_id: challenge.clone()
            })
        );
        assert_eq!(args[1], Argument::NestedResult(0, 0));
    }

    #[test]
    fn test_cancel_has_no_stake() {
        let config = ClientConfig::default();
        let challenge = ObjectId::parse("0xc1").unwrap();
        let tx = calls::cancel_challenge(&config, sender(), &challenge);

        assert_eq!(tx.inputs.len(), 1);
        assert_eq!(tx.split_count(), 0);
        let (target, args) = tx.move_calls().next().unwrap();
        assert!(target.ends_with("::rps_game::cancel_challenge"));
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_legacy_create_passes_amount() {
        let config = ClientConfig::default();
        let cap = config.treasury_cap_id.clone().unwrap();
        let tx = calls::create_challenge_legacy(&config, sender(), &cap, 150);

        let (_, args) = tx.move_calls().next().unwrap();
        assert_eq!(tx.input(args[0]), Some(&CallArg::Object { object_id: cap }));
        assert_eq!(tx.input(args[1]), Some(&CallArg::PureU64 { value: 150 }));
    }

    #[test]
    fn test_request_serializes_for_wallet() {
        let config = ClientConfig::default();
        let challenge = ObjectId::parse("0xc1").unwrap();
        let tx = calls::cancel_challenge(&config, sender(), &challenge);
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["gasBudget"], 10_000_000);
        assert_eq!(json["inputs"][0]["kind"], "object");
        assert_eq!(json["commands"][0]["kind"], "moveCall");
    }
}
