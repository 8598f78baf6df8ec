use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::flat::parse_bet_type;
use crate::context::DecisionContext;

const DEFAULT_MAX_LOSSES: u32 = 15;

fn fib(n: usize) -> u64 {
    let (mut a, mut b) = (1u64, 1u64);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

/// Bets `base_bet * fib(index)`. A loss advances one step along the
/// sequence; a win retreats two steps, per the classic Fibonacci cancellation
/// system (floored at the start of the sequence). `index` is capped at
/// `max_losses`, resetting to the start of the sequence rather than
/// advancing without limit through a long losing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FibonacciState {
    pub base_bet: Money,
    pub index: usize,
    pub max_losses: u32,
    pub bet_multiplier: f64,
    pub bet_type: BetType,
}

impl FibonacciState {
    pub fn new(base_bet: Money, bet_multiplier: f64, bet_type: BetType) -> Self {
        Self::with_max_losses(base_bet, DEFAULT_MAX_LOSSES, bet_multiplier, bet_type)
    }

    pub fn with_max_losses(base_bet: Money, max_losses: u32, bet_multiplier: f64, bet_type: BetType) -> Self {
        Self {
            base_bet,
            index: 0,
            max_losses,
            bet_multiplier,
            bet_type,
        }
    }

    pub fn decide(&self, _ctx: &DecisionContext<'_>) -> BetDecision {
        let amount = self.base_bet.mul_rate(fib(self.index) as f64);
        BetDecision::bet(amount, self.bet_multiplier, self.bet_type, 0.8)
    }

    pub fn update(&mut self, result: &BetResult) {
        if result.won {
            self.index = self.index.saturating_sub(2);
            return;
        }
        self.index += 1;
        if self.index as u32 >= self.max_losses {
            self.index = 0;
        }
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        if action == AltAction::ToggleBetType {
            self.bet_type = self.bet_type.flipped();
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    pub fn genome(&self) -> Genome {
        [
            ("base_bet".to_string(), json!(self.base_bet.to_string())),
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
    fn loss_advances_one_step() {
        let mut state = FibonacciState::new(Money::new(dec!(1)), 2.0, BetType::Under);
        state.update(&result(false));
        assert_eq!(state.index, 1);
        state.update(&result(false));
        assert_eq!(state.index, 2);
    }

    #[test]
    fn index_caps_and_resets_at_max_losses() {
        let mut state = FibonacciState::with_max_losses(Money::new(dec!(1)), 3, 2.0, BetType::Under);
        for _ in 0..3 {
            state.update(&result(false));
        }
        assert_eq!(state.index, 0);
    }

    #[test]
    fn win_retreats_two_steps_floored_at_zero() {
        let mut state = FibonacciState::new(Money::new(dec!(1)), 2.0, BetType::Under);
        state.index = 1;
        state.update(&result(true));
        assert_eq!(state.index, 0);
    }

    #[test]
    fn bet_grows_along_the_sequence() {
        let mut state = FibonacciState::new(Money::new(dec!(1)), 2.0, BetType::Under);
        let gs = diceforge_models::game_state::GameState::new(Money::new(dec!(100)), 20);
        let ctx = DecisionContext {
            game_state: &gs,
            base_bet: Money::new(dec!(1)),
            base_multiplier: 2.0,
            min_bet: Money::new(dec!(0.01)),
            max_bet: Money::new(dec!(1000)),
            default_bet_type: BetType::Under,
        };
        let first = state.decide(&ctx).amount;
        state.update(&result(false));
        let second = state.decide(&ctx).amount;
        assert!(second > first);
    }

    #[test]
    fn genome_round_trips() {
        let mut state = FibonacciState::new(Money::new(dec!(1)), 2.0, BetType::Under);
        state.index = 4;
        let restored = FibonacciState::from_genome(&state.genome()).unwrap();
        assert_eq!(restored.base_bet, state.base_bet);
        assert_eq!(restored.bet_type, state.bet_type);
    }
}
