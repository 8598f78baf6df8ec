use diceforge_models::bet::BetResult;
use diceforge_models::decision::BetDecision;
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MAX_CONFIDENCE: f64 = 1.0;
const WIN_CONFIDENCE_DRIFT: f64 = 0.02;
const LOSS_CONFIDENCE_DRIFT: f64 = -0.03;

/// Bookkeeping shared by every strategy regardless of its progression logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    pub total_bets: u64,
    pub max_bet_seen: Money,
    pub fitness_score: f64,
    pub confidence: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            total_bets: 0,
            max_bet_seen: Money::ZERO,
            fitness_score: 0.0,
            confidence: MAX_CONFIDENCE,
        }
    }
}

impl Metrics {
    /// Fold one resolved bet into the running metrics. A skipped decision
    /// (parking cascades, toggles) never counts as a bet.
    pub fn record(&mut self, decision: &BetDecision, result: &BetResult) {
        if decision.skip {
            return;
        }
        self.total_bets += 1;
        self.max_bet_seen = self.max_bet_seen.max(decision.amount);
        self.fitness_score += result.profit().to_f64_lossy();
        let drift = if result.won {
            WIN_CONFIDENCE_DRIFT
        } else {
            LOSS_CONFIDENCE_DRIFT
        };
        self.confidence = (self.confidence + drift).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use diceforge_models::bet::BetType;
    use rust_decimal_macros::dec;

    fn decision() -> BetDecision {
        BetDecision::bet(Money::new(dec!(1)), 2.0, BetType::Under, 0.5)
    }

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
    fn skipped_decisions_do_not_count_as_bets() {
        let mut metrics = Metrics::default();
        let mut skip = decision();
        skip.skip = true;
        metrics.record(&skip, &result(true));
        assert_eq!(metrics.total_bets, 0);
    }

    #[test]
    fn confidence_drifts_within_bounds() {
        let mut metrics = Metrics::default();
        for _ in 0..100 {
            metrics.record(&decision(), &result(false));
        }
        assert!(metrics.confidence >= MIN_CONFIDENCE);

        let mut metrics = Metrics::default();
        for _ in 0..100 {
            metrics.record(&decision(), &result(true));
        }
        assert!(metrics.confidence <= MAX_CONFIDENCE);
    }
}
