use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::flat::parse_bet_type;
use crate::context::DecisionContext;

const DEFAULT_WIN_CAP: u32 = 3;
const DEFAULT_MULTIPLIER_FACTOR: f64 = 2.0;

/// The "reverse Martingale": doubles the bet after a win, resets on a loss,
/// and also resets after `win_cap` consecutive wins to bank the streak
/// instead of riding it indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParoliState {
    pub base_bet: Money,
    pub current_bet: Money,
    pub win_streak: u32,
    pub win_cap: u32,
    pub multiplier_factor: f64,
    pub bet_multiplier: f64,
    pub bet_type: BetType,
}

impl ParoliState {
    pub fn new(base_bet: Money, bet_multiplier: f64, bet_type: BetType) -> Self {
        Self {
            base_bet,
            current_bet: base_bet,
            win_streak: 0,
            win_cap: DEFAULT_WIN_CAP,
            multiplier_factor: DEFAULT_MULTIPLIER_FACTOR,
            bet_multiplier,
            bet_type,
        }
    }

    pub fn decide(&self, _ctx: &DecisionContext<'_>) -> BetDecision {
        BetDecision::bet(self.current_bet, self.bet_multiplier, self.bet_type, 0.75)
    }

    pub fn update(&mut self, result: &BetResult) {
        if !result.won {
            self.current_bet = self.base_bet;
            self.win_streak = 0;
            return;
        }

        self.win_streak += 1;
        if self.win_streak >= self.win_cap {
            self.current_bet = self.base_bet;
            self.win_streak = 0;
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
        self.win_streak = 0;
    }

    pub fn genome(&self) -> Genome {
        [
            ("base_bet".to_string(), json!(self.base_bet.to_string())),
            ("win_cap".to_string(), json!(self.win_cap)),
            ("bet_multiplier".to_string(), json!(self.bet_multiplier)),
            ("bet_type".to_string(), json!(format!("{:?}", self.bet_type))),
        ]
        .into_iter()
        .collect()
    }

    pub fn from_genome(genome: &Genome) -> Option<Self> {
        let mut state = Self::new(
            Money::parse(genome.get("base_bet")?.as_str()?).ok()?,
            genome.get("bet_multiplier")?.as_f64()?,
            parse_bet_type(genome.get("bet_type")?.as_str()?)?,
        );
        state.win_cap = genome.get("win_cap")?.as_u64()? as u32;
        Some(state)
    }
}
