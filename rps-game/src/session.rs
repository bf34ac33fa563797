//! The lobby session: connected account, cached queries and in-flight actions.
//!
//! A `Session` is the single shared context everything else hangs off. It
//! owns one ledger reader, one wallet provider and one set of query cells.
//! Without a connected account every address-dependent query is disabled and
//! simply does not run.

use crate::action::{ActionKey, ActionStatus, ActionTracker};
use crate::challenge::Challenge;
use crate::discovery::DiscoveryStrategy;
use crate::error::{GameError, Result};
use crate::lobby::LobbyView;
use crate::notice::{Notice, Notifier};
use crate::query::Query;
use rps_core::stake::{insufficient_stake_message, stake_source};
use rps_core::transaction::calls;
use rps_core::{
    parse_stake, Address, ChallengeSchema, ClientConfig, CoinObject, ExecutionResult,
    LedgerReader, ObjectId, RpsError, TokenBalance, TransactionRequest, WalletProvider,
};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct SessionState {
    epoch: u64,
    account: Option<Address>,
    stake_input: String,
    balance: Query<TokenBalance>,
    coins: Query<Vec<CoinObject>>,
    package: Query<bool>,
    challenges: Query<Vec<Challenge>>,
    actions: ActionTracker,
}

impl SessionState {
    fn for_account(account: Option<Address>, epoch: u64) -> Self {
        fn query<T>(enabled: bool) -> Query<T> {
            if enabled {
                Query::enabled()
            } else {
                Query::disabled()
            }
        }

        let connected = account.is_some();
        Self {
            epoch,
            account,
            stake_input: String::new(),
            balance: query(connected),
            coins: query(connected),
            package: query(connected),
            challenges: query(connected),
            actions: ActionTracker::new(),
        }
    }
}

/// Copy of the session state for rendering.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub account: Option<Address>,
    pub stake_input: String,
    pub balance: Query<TokenBalance>,
    pub coins: Query<Vec<CoinObject>>,
    pub package: Query<bool>,
    pub challenges: Query<Vec<Challenge>>,
    pub pending: Vec<ActionKey>,
}

impl SessionSnapshot {
    pub fn package_ready(&self) -> bool {
        self.package.data().copied().unwrap_or(false)
    }

    pub fn lobby(&self) -> LobbyView {
        LobbyView::build(
            self.challenges.data().map(Vec::as_slice).unwrap_or(&[]),
            self.account.as_ref(),
        )
    }
}

/// Queries re-issued after a successful action.
#[derive(Debug, Clone, Copy)]
struct Refetch {
    balance: bool,
    coins: bool,
    challenges: bool,
}

impl Refetch {
    const ALL: Refetch = Refetch {
        balance: true,
        coins: true,
        challenges: true,
    };

    const CHALLENGES: Refetch = Refetch {
        balance: false,
        coins: false,
        challenges: true,
    };
}

struct Submission {
    epoch: u64,
    key: ActionKey,
    tx: TransactionRequest,
    success: &'static str,
    failure_prefix: &'static str,
    refetch: Refetch,
}

fn settle<T>(query: &mut Query<T>, result: rps_core::Result<T>) -> Result<()> {
    match result {
        Ok(data) => {
            query.store(Ok(data));
            Ok(())
        }
        Err(e) => {
            query.store(Err(e.to_string()));
            Err(e.into())
        }
    }
}

pub struct Session {
    config: ClientConfig,
    strategy: DiscoveryStrategy,
    reader: Arc<dyn LedgerReader>,
    wallet: Arc<dyn WalletProvider>,
    notifier: Arc<dyn Notifier>,
    state: RwLock<SessionState>,
}

impl Session {
    pub fn new(
        config: ClientConfig,
        reader: Arc<dyn LedgerReader>,
        wallet: Arc<dyn WalletProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let strategy = DiscoveryStrategy::for_config(&config);
        Self {
            config,
            strategy,
            reader,
            wallet,
            notifier,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn account(&self) -> Option<Address> {
        self.state.read().account.clone()
    }

    pub fn epoch(&self) -> u64 {
        self.state.read().epoch
    }

    /// Ask the wallet provider for its account, adopt it, and load every query.
    pub async fn connect(&self) -> Result<Option<Address>> {
        self.sync_account().await?;

        if let Err(e) = self.refetch_all().await {
            tracing::warn!("Initial refresh incomplete: {}", e);
        }
        Ok(self.account())
    }

    /// Adopt the wallet's current account. The wallet may switch accounts at
    /// any time; returns whether it did since the last check.
    pub async fn sync_account(&self) -> Result<bool> {
        let account = self.wallet.current_account().await?;
        Ok(self.set_account(account))
    }

    /// Point the wallet at `account` and reload everything for it.
    pub async fn select_account(&self, account: Option<Address>) -> Result<()> {
        self.wallet.select_account(account.clone())?;
        self.set_account(account);
        self.refetch_all().await
    }

    /// Switch the connected account.
    ///
    /// Resets pending markers, the stake input and every query cell before
    /// anything new is fetched. Actions still in flight for the previous
    /// account finish without touching the new state. Returns whether the
    /// account actually changed.
    pub fn set_account(&self, account: Option<Address>) -> bool {
        let mut state = self.state.write();
        if state.account == account {
            return false;
        }

        let epoch = state.epoch + 1;
        match &account {
            Some(a) => tracing::info!("Wallet account switched to {}", a),
            None => tracing::info!("Wallet disconnected"),
        }
        *state = SessionState::for_account(account, epoch);
        true
    }

    pub fn set_stake_input(&self, input: impl Into<String>) {
        self.state.write().stake_input = input.into();
    }

    pub fn stake_input(&self) -> String {
        self.state.read().stake_input.clone()
    }

    pub fn action_status(&self, key: &ActionKey) -> ActionStatus {
        self.state.read().actions.status(key)
    }

    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.state.read().actions.is_pending(key)
    }

    pub fn package_ready(&self) -> bool {
        self.state.read().package.data().copied().unwrap_or(false)
    }

    /// Whether the create control should be enabled right now.
    pub fn can_create(&self) -> bool {
        let state = self.state.read();
        state.account.is_some()
            && !state.actions.is_pending(&ActionKey::Create)
            && state.package.data().copied().unwrap_or(false)
            && parse_stake(&state.stake_input).is_ok()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read();
        SessionSnapshot {
            account: state.account.clone(),
            stake_input: state.stake_input.clone(),
            balance: state.balance.clone(),
            coins: state.coins.clone(),
            package: state.package.clone(),
            challenges: state.challenges.clone(),
            pending: state.actions.pending(),
        }
    }

    pub fn lobby(&self) -> LobbyView {
        self.snapshot().lobby()
    }

    /// Epoch and account for a query about to run, or `None` when disabled.
    fn query_input(&self) -> Option<(u64, Address)> {
        let state = self.state.read();
        state.account.clone().map(|account| (state.epoch, account))
    }

    /// Apply `f` only if no account switch happened since `epoch`.
    fn in_epoch<R>(&self, epoch: u64, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        let mut state = self.state.write();
        if state.epoch != epoch {
            tracing::debug!("Dropping result from a previous wallet session");
            return None;
        }
        Some(f(&mut state))
    }

    pub async fn refetch_balance(&self) -> Result<()> {
        let Some((epoch, account)) = self.query_input() else {
            return Ok(());
        };
        let result = self
            .reader
            .get_balance(&account, &self.config.coin_type())
            .await;
        self.in_epoch(epoch, |state| settle(&mut state.balance, result))
            .unwrap_or(Ok(()))
    }

    pub async fn refetch_coins(&self) -> Result<()> {
        let Some((epoch, account)) = self.query_input() else {
            return Ok(());
        };
        let result = self
            .reader
            .get_coins(&account, &self.config.coin_type())
            .await;
        self.in_epoch(epoch, |state| settle(&mut state.coins, result))
            .unwrap_or(Ok(()))
    }

    pub async fn refetch_package(&self) -> Result<()> {
        let Some((epoch, _)) = self.query_input() else {
            return Ok(());
        };
        let result = self
            .reader
            .get_object(&self.config.package_id)
            .await
            .map(|object| object.exists());
        self.in_epoch(epoch, |state| settle(&mut state.package, result))
            .unwrap_or(Ok(()))
    }

    pub async fn refetch_challenges(&self) -> Result<()> {
        let Some((epoch, account)) = self.query_input() else {
            return Ok(());
        };
        let result = self
            .strategy
            .discover(self.reader.as_ref(), &self.config, &account)
            .await;
        self.in_epoch(epoch, |state| settle(&mut state.challenges, result))
            .unwrap_or(Ok(()))
    }

    /// Re-check the wallet account, then refetch every query concurrently.
    /// Returns the first failure, if any; each failure is also kept on its
    /// query cell.
    pub async fn refresh_all(&self) -> Result<()> {
        self.sync_account().await?;
        self.refetch_all().await
    }

    async fn refetch_all(&self) -> Result<()> {
        let (balance, coins, package, challenges) = futures::join!(
            self.refetch_balance(),
            self.refetch_coins(),
            self.refetch_package(),
            self.refetch_challenges()
        );
        balance.and(coins).and(package).and(challenges)
    }

    async fn run_refetch(&self, refetch: Refetch) {
        let balance = async {
            if refetch.balance {
                self.refetch_balance().await
            } else {
                Ok(())
            }
        };
        let coins = async {
            if refetch.coins {
                self.refetch_coins().await
            } else {
                Ok(())
            }
        };
        let challenges = async {
            if refetch.challenges {
                self.refetch_challenges().await
            } else {
                Ok(())
            }
        };

        let (b, c, ch) = futures::join!(balance, coins, challenges);
        if let Err(e) = b.and(c).and(ch) {
            tracing::warn!("Refresh after action failed: {}", e);
        }
    }

    /// Report a failed precondition. Nothing has been submitted.
    fn reject<T>(&self, err: GameError) -> Result<T> {
        tracing::warn!("Action rejected: {}", err);
        self.notifier.notify(Notice::error(err.user_message()));
        Err(err)
    }

    fn reject_insufficient<T>(&self, err: RpsError, action: &str) -> Result<T> {
        match err {
            RpsError::InsufficientFunds { need, .. } => self.reject(GameError::Core(
                RpsError::precondition(insufficient_stake_message(need, action)),
            )),
            other => self.reject(other.into()),
        }
    }

    fn find_challenge(&self, id: &ObjectId) -> Option<Challenge> {
        self.state
            .read()
            .challenges
            .data()
            .and_then(|all| all.iter().find(|c| &c.id == id).cloned())
    }

    /// Account an action runs as, after catching up with the wallet.
    async fn connected(&self) -> Result<(u64, Address)> {
        match self.sync_account().await {
            Ok(true) => tracing::info!("Wallet account changed; session state was reset"),
            Ok(false) => {}
            Err(e) => return self.reject(e),
        }

        match self.query_input() {
            Some(input) => Ok(input),
            None => self.reject(RpsError::NotConnected.into()),
        }
    }

    fn ensure_idle(&self, key: &ActionKey) -> Result<()> {
        if self.is_pending(key) {
            return Err(GameError::AlreadyPending(key.to_string()));
        }
        Ok(())
    }

    fn coins(&self) -> Vec<CoinObject> {
        self.state.read().coins.data().cloned().unwrap_or_default()
    }

    /// Create a challenge staking the amount currently in the stake input.
    pub async fn create_challenge(&self) -> Result<ExecutionResult> {
        let (epoch, account) = self.connected().await?;
        let key = ActionKey::Create;
        self.ensure_idle(&key)?;

        let required = match parse_stake(&self.stake_input()) {
            Ok(units) => units,
            Err(e) => return self.reject(e.into()),
        };

        if !self.package_ready() {
            return self.reject(GameError::PackageNotReady);
        }

        let tx = match self.config.schema {
            ChallengeSchema::Shared => {
                let coins = self.coins();
                if coins.is_empty() {
                    return self.reject(GameError::Core(RpsError::precondition(
                        "You need RPS tokens to create a challenge!",
                    )));
                }
                let source = match stake_source(&coins, required) {
                    Ok(source) => source,
                    Err(e) => return self.reject_insufficient(e, "create this challenge"),
                };
                calls::create_challenge(&self.config, account, &source)
            }
            ChallengeSchema::Owned => {
                let Some(cap) = self.config.treasury_cap_id.as_ref() else {
                    return self.reject(GameError::Core(RpsError::config(
                        "No treasury capability configured",
                    )));
                };
                calls::create_challenge_legacy(&self.config, account, cap, required)
            }
        };

        self.submit(Submission {
            epoch,
            key,
            tx,
            success: "Challenge created successfully!",
            failure_prefix: "Error",
            refetch: Refetch::ALL,
        })
        .await
    }

    /// Convenience for one-shot callers: set the stake input, then create.
    pub async fn create_challenge_with(&self, stake: &str) -> Result<ExecutionResult> {
        self.set_stake_input(stake);
        self.create_challenge().await
    }

    pub async fn join_challenge(&self, id: &ObjectId) -> Result<ExecutionResult> {
        let (epoch, account) = self.connected().await?;
        let key = ActionKey::Join(id.clone());
        self.ensure_idle(&key)?;

        let Some(challenge) = self.find_challenge(id) else {
            return self.reject(GameError::ChallengeNotFound(id.clone()));
        };

        if challenge.is_created_by(&account) {
            return self.reject(GameError::not_available(
                "You cannot join your own challenge",
            ));
        }

        if !challenge.is_open() {
            return self.reject(GameError::not_available(
                "This challenge is no longer open",
            ));
        }

        let coins = self.coins();
        if coins.is_empty() {
            return self.reject(GameError::Core(RpsError::precondition(
                "You need RPS tokens to join a challenge!",
            )));
        }

        let source = match stake_source(&coins, challenge.stake_amount) {
            Ok(source) => source,
            Err(e) => return self.reject_insufficient(e, "join this challenge"),
        };

        let tx = calls::join_challenge(&self.config, account, id, &source);
        self.submit(Submission {
            epoch,
            key,
            tx,
            success: "Challenge joined successfully! Game starting!",
            failure_prefix: "Error joining challenge",
            refetch: Refetch::CHALLENGES,
        })
        .await
    }

    pub async fn cancel_challenge(&self, id: &ObjectId) -> Result<ExecutionResult> {
        let (epoch, account) = self.connected().await?;
        let key = ActionKey::Cancel(id.clone());
        self.ensure_idle(&key)?;

        let Some(challenge) = self.find_challenge(id) else {
            return self.reject(GameError::ChallengeNotFound(id.clone()));
        };

        if !challenge.is_created_by(&account) || !challenge.is_open() {
            return self.reject(GameError::not_available(
                "Only the creator can cancel a challenge nobody has joined",
            ));
        }

        let tx = calls::cancel_challenge(&self.config, account, id);
        self.submit(Submission {
            epoch,
            key,
            tx,
            success: "Challenge cancelled. Your stake has been returned.",
            failure_prefix: "Error cancelling challenge",
            refetch: Refetch::ALL,
        })
        .await
    }

    async fn submit(&self, submission: Submission) -> Result<ExecutionResult> {
        let Submission {
            epoch,
            key,
            tx,
            success,
            failure_prefix,
            refetch,
        } = submission;

        let invocation = match self.in_epoch(epoch, |state| state.actions.begin(key.clone())) {
            Some(Some(invocation)) => invocation,
            Some(None) => return Err(GameError::AlreadyPending(key.to_string())),
            None => {
                return Err(GameError::not_available(
                    "Wallet changed before the transaction was submitted",
                ))
            }
        };

        tracing::info!("Submitting {} ({})", key, invocation);

        match self.wallet.sign_and_execute(&tx).await {
            Ok(result) => {
                let current = self
                    .in_epoch(epoch, |state| {
                        state.actions.finish(
                            &key,
                            invocation,
                            ActionStatus::Succeeded {
                                digest: result.digest.clone(),
                            },
                        );
                        if key == ActionKey::Create {
                            state.stake_input.clear();
                        }
                    })
                    .is_some();

                tracing::info!("{} succeeded: {}", key, result.digest);
                self.notifier.notify(Notice::success(success));

                if current {
                    self.run_refetch(refetch).await;
                }
                Ok(result)
            }
            Err(e) => {
                let err = GameError::from(e);
                let message = err.user_message();
                self.in_epoch(epoch, |state| {
                    state.actions.finish(
                        &key,
                        invocation,
                        ActionStatus::Failed {
                            message: message.clone(),
                        },
                    )
                });

                tracing::warn!("{} failed: {}", key, message);
                self.notifier
                    .notify(Notice::error(format!("{}: {}", failure_prefix, message)));
                Err(err)
            }
        }
    }
}
