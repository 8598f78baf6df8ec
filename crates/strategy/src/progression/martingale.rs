use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::flat::parse_bet_type;
use crate::context::DecisionContext;

const DEFAULT_MULTIPLIER_FACTOR: f64 = 2.0;

/// Doubles the bet after every loss, resetting to the base bet on a win or
/// once the loss streak hits `max_doublings` (MARTINGALE_CAPPED) — the same
/// reset-on-cap behaviour a bounded-bankroll martingale bot falls back to
/// rather than doubling without limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MartingaleState {
    pub base_bet: Money,
    pub current_bet: Money,
    pub multiplier_factor: f64,
    pub max_doublings: u32,
    pub consecutive_losses: u32,
    pub bet_multiplier: f64,
    pub bet_type: BetType,
}

impl MartingaleState {
    pub fn new(base_bet: Money, max_doublings: u32, bet_multiplier: f64, bet_type: BetType) -> Self {
        Self {
            base_bet,
            current_bet: base_bet,
            multiplier_factor: DEFAULT_MULTIPLIER_FACTOR,
            max_doublings,
            consecutive_losses: 0,
            bet_multiplier,
            bet_type,
        }
    }

    pub fn decide(&self, _ctx: &DecisionContext<'_>) -> BetDecision {
        let confidence = 1.0 - (self.consecutive_losses as f64 * 0.1).min(0.6);
        BetDecision::bet(self.current_bet, self.bet_multiplier, self.bet_type, confidence)
    }

    pub fn update(&mut self, result: &BetResult) {
        if result.won {
            self.consecutive_losses = 0;
            self.current_bet = self.base_bet;
            return;
        }

        self.consecutive_losses += 1;
        if self.consecutive_losses >= self.max_doublings {
            self.consecutive_losses = 0;
            self.current_bet = self.base_bet;
        } else {
            self.current_bet = self.current_bet.mul_rate(self.multiplier_factor);
        }
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        if action == AltAction::ToggleBetType {
            self.bet_type = self.bet_type.flipped();
        }
    }

    pub fn reset(&mut self) {
        self.current_bet = self.base_bet;
        self.consecutive_losses = 0;
    }

    pub fn genome(&self) -> Genome {
        [
            ("base_bet".to_string(), json!(self.base_bet.to_string())),
            ("max_doublings".to_string(), json!(self.max_doublings)),
            ("bet_multiplier".to_string(), json!(self.bet_multiplier)),
            ("bet_type".to_string(), json!(format!("{:?}", self.bet_type))),
        ]
        .into_iter()
        .collect()
    }

    pub fn from_genome(genome: &Genome) -> Option<Self> {
        Some(Self::new(
            Money::parse(genome.get("base_bet")?.as_str()?).ok()?,
            genome.get("max_doublings")?.as_u64()? as u32,
            genome.get("bet_multiplier")?.as_f64()?,
            parse_bet_type(genome.get("bet_type")?.as_str()?)?,
        ))
    }
}
