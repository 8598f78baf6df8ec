use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetType {
    Under,
    Over,
}

impl BetType {
    pub fn flipped(self) -> Self {
        match self {
            BetType::Under => BetType::Over,
            BetType::Over => BetType::Under,
        }
    }
}

/// Immutable record of one resolved roll.
///
/// `roll` is the oracle's output in `[0.00, 99.99]` at 0.01 step precision;
/// `threshold` is the `f64` win boundary derived from the multiplier under
/// the 1% house edge. The threshold comparison intentionally mixes an
/// `f64` boundary with the cryptographic decimal roll — only the resulting
/// `won` boolean ever reaches the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetResult {
    pub roll: rust_decimal::Decimal,
    pub threshold: f64,
    pub won: bool,
    pub bet: Money,
    pub multiplier: f64,
    pub payout: Money,
    pub bet_type: BetType,
    pub server_seed_hash: String,
    pub client_seed: String,
    pub nonce: u64,
    pub timestamp: DateTime<Utc>,
}

impl BetResult {
    pub fn profit(&self) -> Money {
        if self.won {
            self.payout - self.bet
        } else {
            -self.bet
        }
    }
}
