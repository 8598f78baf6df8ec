use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bet::BetType;
use crate::money::Money;

/// A non-bet action a strategy (or its parking wrapper) can request in place
/// of placing a bet. None of these consume a nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltAction {
    ToggleBetType,
    RotateSeed,
    ParkingBet,
}

/// What a strategy returns from `decide()` for a single iteration of the
/// session loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetDecision {
    pub amount: Money,
    pub multiplier: f64,
    pub bet_type: BetType,
    pub skip: bool,
    pub action: Option<AltAction>,
    pub confidence: f64,
    pub metadata: HashMap<String, Value>,
}

impl BetDecision {
    pub fn bet(amount: Money, multiplier: f64, bet_type: BetType, confidence: f64) -> Self {
        Self {
            amount,
            multiplier,
            bet_type,
            skip: false,
            action: None,
            confidence,
            metadata: HashMap::new(),
        }
    }

    pub fn skip_with(action: AltAction, bet_type: BetType, confidence: f64) -> Self {
        Self {
            amount: Money::ZERO,
            multiplier: 2.0,
            bet_type,
            skip: true,
            action: Some(action),
            confidence,
            metadata: HashMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Opaque serialised snapshot of a strategy's tunables, for later
/// reproduction. `Strategy::from_genome` is the corresponding reconstructor.
pub type Genome = HashMap<String, Value>;
