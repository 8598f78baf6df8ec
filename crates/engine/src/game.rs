use chrono::Utc;
use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::error::EngineError;
use diceforge_models::money::Money;
use diceforge_oracle::roll::{threshold_for_multiplier, RollOracle};
use rust_decimal::prelude::ToPrimitive;

pub const DEFAULT_MIN_MULTIPLIER: f64 = 1.01;
pub const DEFAULT_MAX_MULTIPLIER: f64 = 99.0;

/// Wraps one [`RollOracle`] and turns a bet request into a resolved
/// [`BetResult`], consuming exactly one nonce per successful call.
pub struct Game {
    oracle: RollOracle,
    min_multiplier: f64,
    max_multiplier: f64,
}

impl Game {
    /// Uses the spec-default multiplier bounds `[1.01, 99.00]`; use
    /// [`Game::with_multiplier_bounds`] to source them from config instead.
    pub fn new(oracle: RollOracle) -> Self {
        Self::with_multiplier_bounds(oracle, DEFAULT_MIN_MULTIPLIER, DEFAULT_MAX_MULTIPLIER)
    }

    pub fn with_multiplier_bounds(oracle: RollOracle, min_multiplier: f64, max_multiplier: f64) -> Self {
        Self {
            oracle,
            min_multiplier,
            max_multiplier,
        }
    }

    pub fn oracle_mut(&mut self) -> &mut RollOracle {
        &mut self.oracle
    }

    pub fn oracle(&self) -> &RollOracle {
        &self.oracle
    }

    /// Validate the bet shape, consume one nonce, and resolve win/loss. The
    /// `f64` threshold is compared directly against the decimal roll
    /// converted to `f64` — the one point in the ledger where a binary
    /// float is allowed to decide an outcome, never to store one.
    pub fn roll(&mut self, bet: Money, multiplier: f64, bet_type: BetType) -> Result<BetResult, EngineError> {
        if bet.is_zero() || bet.is_negative() {
            return Err(EngineError::BetInvalid {
                reason: format!("bet amount must be positive, got {bet}"),
            });
        }
        if !(self.min_multiplier..=self.max_multiplier).contains(&multiplier) {
            return Err(EngineError::BetInvalid {
                reason: format!(
                    "multiplier {multiplier} outside supported range [{}, {}]",
                    self.min_multiplier, self.max_multiplier
                ),
            });
        }

        let threshold = threshold_for_multiplier(multiplier);
        let info = self.oracle.current_info();
        let (roll, nonce, _digest) = self.oracle.roll()?;
        let roll_f64 = roll.to_f64().unwrap_or(0.0);

        let won = match bet_type {
            BetType::Under => roll_f64 < threshold,
            BetType::Over => roll_f64 > (100.0 - threshold),
        };
        let payout = if won { bet.mul_rate(multiplier) } else { Money::ZERO };

        Ok(BetResult {
            roll,
            threshold,
            won,
            bet,
            multiplier,
            payout,
            bet_type,
            server_seed_hash: info.server_seed_hash,
            client_seed: info.client_seed,
            nonce,
            timestamp: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn game() -> Game {
        Game::new(RollOracle::new("server-seed".into(), "client-seed".into()))
    }

    #[test]
    fn rejects_non_positive_bets() {
        let mut g = game();
        let err = g.roll(Money::ZERO, 2.0, BetType::Under).unwrap_err();
        assert!(matches!(err, EngineError::BetInvalid { .. }));
    }

    #[test]
    fn rejects_multiplier_out_of_range() {
        let mut g = game();
        let err = g.roll(Money::new(dec!(1)), 1.0, BetType::Under).unwrap_err();
        assert!(matches!(err, EngineError::BetInvalid { .. }));
    }

    #[test]
    fn each_roll_consumes_exactly_one_nonce() {
        let mut g = game();
        g.roll(Money::new(dec!(1)), 2.0, BetType::Under).unwrap();
        assert_eq!(g.oracle().current_info().nonce, 1);
        g.roll(Money::new(dec!(1)), 2.0, BetType::Under).unwrap();
        assert_eq!(g.oracle().current_info().nonce, 2);
    }

    #[test]
    fn win_pays_out_bet_times_multiplier() {
        let mut g = game();
        for _ in 0..200 {
            let result = g.roll(Money::new(dec!(1)), 2.0, BetType::Under).unwrap();
            if result.won {
                assert_eq!(result.payout, Money::new(dec!(1)).mul_rate(2.0));
                return;
            }
        }
        panic!("expected at least one win in 200 rolls at ~49.5% win chance");
    }
}
