//! Stake arithmetic for the game token.
//!
//! The token carries two implied decimal places: a user-facing amount of
//! `1.50` is stored on the ledger as `150` units.

use crate::error::{Result, RpsError};
use crate::types::CoinObject;

/// Units per whole token.
pub const UNITS_PER_TOKEN: u64 = 100;

/// Number of fractional digits the token keeps.
pub const DECIMALS: usize = 2;

/// Parse a user stake input into smallest units.
///
/// Computes floor(value * 100) on the decimal string itself, so inputs like
/// `1.15` do not lose a unit to float rounding.
pub fn parse_stake(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(RpsError::invalid_stake("stake amount is required"));
    }

    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with('-') {
        return Err(RpsError::invalid_stake(format!(
            "'{}' must be greater than zero",
            input
        )));
    }

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(RpsError::invalid_stake(format!("'{}' is not a number", input)));
    }

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(RpsError::invalid_stake(format!("'{}' is not a number", input)));
    }

    let whole_units = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .ok()
            .and_then(|w| w.checked_mul(UNITS_PER_TOKEN))
            .ok_or_else(|| RpsError::invalid_stake(format!("'{}' is too large", input)))?
    };

    // digits past the second decimal are floored away
    let mut cents = String::with_capacity(DECIMALS);
    cents.extend(fraction.chars().take(DECIMALS));
    while cents.len() < DECIMALS {
        cents.push('0');
    }
    let fraction_units: u64 = cents
        .parse()
        .map_err(|_| RpsError::invalid_stake(format!("'{}' is not a number", input)))?;

    let units = whole_units
        .checked_add(fraction_units)
        .ok_or_else(|| RpsError::invalid_stake(format!("'{}' is too large", input)))?;

    if units == 0 {
        return Err(RpsError::invalid_stake(format!(
            "'{}' must be greater than zero",
            input
        )));
    }

    Ok(units)
}

/// Format smallest units as a token amount with two decimals.
pub fn format_units(units: u64) -> String {
    format!(
        "{}.{:02}",
        units / UNITS_PER_TOKEN,
        units % UNITS_PER_TOKEN
    )
}

/// Pick the first coin, in the order given, that can cover `required` units.
pub fn select_coin(coins: &[CoinObject], required: u64) -> Result<&CoinObject> {
    coins
        .iter()
        .find(|coin| coin.balance >= required)
        .ok_or_else(|| {
            let available = coins.iter().map(|c| c.balance).max().unwrap_or(0);
            tracing::debug!(
                "No coin covers {} units (largest holding {})",
                required,
                available
            );
            RpsError::InsufficientFunds {
                need: required,
                available,
            }
        })
}

/// How the stake input of a transaction is obtained from a coin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakeSource {
    /// The coin holds exactly the stake and is passed as is.
    Whole(CoinObject),
    /// The coin is split and only `amount` units are staked.
    Split { coin: CoinObject, amount: u64 },
}

impl StakeSource {
    pub fn for_coin(coin: &CoinObject, required: u64) -> Self {
        if coin.balance == required {
            StakeSource::Whole(coin.clone())
        } else {
            StakeSource::Split {
                coin: coin.clone(),
                amount: required,
            }
        }
    }

    pub fn coin(&self) -> &CoinObject {
        match self {
            StakeSource::Whole(coin) => coin,
            StakeSource::Split { coin, .. } => coin,
        }
    }

    pub fn needs_split(&self) -> bool {
        matches!(self, StakeSource::Split { .. })
    }
}

/// Select a coin and decide whether it must be split to stake `required` units.
pub fn stake_source(coins: &[CoinObject], required: u64) -> Result<StakeSource> {
    let coin = select_coin(coins, required)?;
    Ok(StakeSource::for_coin(coin, required))
}

/// Message shown when no holding can cover a stake.
pub fn insufficient_stake_message(required: u64, action: &str) -> String {
    format!(
        "You need at least {} RPS tokens to {}!",
        format_units(required),
        action
    )
}
