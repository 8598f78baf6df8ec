use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::flat::parse_bet_type;
use crate::context::DecisionContext;

const DEFAULT_MAX_LOSSES: u32 = 15;

/// Steps the bet up by one unit after a loss and down by one unit after a
/// win, never dropping below `base_bet`. A gentler progression than
/// Martingale's doubling. `consecutive_losses` is capped at `max_losses`:
/// the step right after the cap is hit resets to `base_bet`, the same
/// reset-on-cap behaviour Martingale uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DAlembertState {
    pub base_bet: Money,
    pub unit: Money,
    pub current_bet: Money,
    pub max_losses: u32,
    pub consecutive_losses: u32,
    pub bet_multiplier: f64,
    pub bet_type: BetType,
}

impl DAlembertState {
    pub fn new(base_bet: Money, unit: Money, bet_multiplier: f64, bet_type: BetType) -> Self {
        Self::with_max_losses(base_bet, unit, DEFAULT_MAX_LOSSES, bet_multiplier, bet_type)
    }

    pub fn with_max_losses(base_bet: Money, unit: Money, max_losses: u32, bet_multiplier: f64, bet_type: BetType) -> Self {
        Self {
            base_bet,
            unit,
            current_bet: base_bet,
            max_losses,
            consecutive_losses: 0,
            bet_multiplier,
            bet_type,
        }
    }

    pub fn decide(&self, _ctx: &DecisionContext<'_>) -> BetDecision {
        BetDecision::bet(self.current_bet, self.bet_multiplier, self.bet_type, 0.85)
    }

    pub fn update(&mut self, result: &BetResult) {
        if result.won {
            self.consecutive_losses = 0;
            self.current_bet = (self.current_bet - self.unit).max(self.base_bet);
            return;
        }

        self.consecutive_losses += 1;
        if self.consecutive_losses >= self.max_losses {
            self.consecutive_losses = 0;
            self.current_bet = self.base_bet;
        } else {
            self.current_bet += self.unit;
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
            ("unit".to_string(), json!(self.unit.to_string())),
            ("max_losses".to_string(), json!(self.max_losses)),
            ("bet_multiplier".to_string(), json!(self.bet_multiplier)),
            ("bet_type".to_string(), json!(format!("{:?}", self.bet_type))),
        ]
        .into_iter()
        .collect()
    }

    pub fn from_genome(genome: &Genome) -> Option<Self> {
        Some(Self::with_max_losses(
            Money::parse(genome.get("base_bet")?.as_str()?).ok()?,
            Money::parse(genome.get("unit")?.as_str()?).ok()?,
            genome.get("max_losses").and_then(|v| v.as_u64()).map_or(DEFAULT_MAX_LOSSES, |v| v as u32),
            genome.get("bet_multiplier")?.as_f64()?,
            parse_bet_type(genome.get("bet_type")?.as_str()?)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn result(won: bool) -> BetResult {
        BetResult {
            roll: dec!(10.0),
            threshold: 49.5,
            won,
            bet: Money::new(dec!(1)),
            multiplier: 2.0,
            payout: if won { Money::new(dec!(2)) } else { Money::ZERO },
            bet_type: BetType::Under,
            server_seed_hash: "h".into(),
            client_seed: "c".into(),
            nonce: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn bet_never_drops_below_base() {
        let mut state = DAlembertState::new(Money::new(dec!(1)), Money::new(dec!(0.5)), 2.0, BetType::Under);
        state.update(&result(true));
        assert_eq!(state.current_bet, state.base_bet);
    }

    #[test]
    fn caps_and_resets_at_max_losses() {
        let mut state = DAlembertState::with_max_losses(Money::new(dec!(1)), Money::new(dec!(0.5)), 3, 2.0, BetType::Under);
        for _ in 0..3 {
            state.update(&result(false));
        }
        assert_eq!(state.current_bet, state.base_bet);
        assert_eq!(state.consecutive_losses, 0);
    }

    #[test]
    fn loss_then_win_returns_to_base() {
        let mut state = DAlembertState::new(Money::new(dec!(1)), Money::new(dec!(0.5)), 2.0, BetType::Under);
        state.update(&result(false));
        assert_eq!(state.current_bet, Money::new(dec!(1.5)));
        state.update(&result(true));
        assert_eq!(state.current_bet, Money::new(dec!(1)));
    }

    #[test]
    fn genome_round_trips() {
        let state = DAlembertState::new(Money::new(dec!(2)), Money::new(dec!(0.25)), 2.0, BetType::Over);
        let restored = DAlembertState::from_genome(&state.genome()).unwrap();
        assert_eq!(restored.unit, state.unit);
        assert_eq!(restored.bet_type, state.bet_type);
    }
}
