use std::collections::HashMap;

use diceforge_models::bet::BetResult;
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::DecisionContext;
use crate::strategy::Strategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AdaptiveCondition {
    ConsecutiveLosses(u64),
    ConsecutiveWins(u64),
    DrawdownPct(f64),
    ProfitPct(f64),
    LowConfidence(f64),
    BalanceBelow(Money),
    BalanceAbove(Money),
}

impl AdaptiveCondition {
    fn matches(&self, ctx: &DecisionContext<'_>, confidence: f64) -> bool {
        let gs = ctx.game_state;
        match self {
            Self::ConsecutiveLosses(n) => gs.consecutive_losses() >= *n,
            Self::ConsecutiveWins(n) => gs.consecutive_wins() >= *n,
            Self::DrawdownPct(pct) => gs.current_drawdown >= *pct,
            Self::ProfitPct(pct) => gs.roi() >= *pct,
            Self::LowConfidence(pct) => confidence <= *pct,
            Self::BalanceBelow(m) => gs.balance < *m,
            Self::BalanceAbove(m) => gs.balance > *m,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveRule {
    pub condition: AdaptiveCondition,
    pub target_index: usize,
}

/// Switches between a fixed roster of candidate strategies as session
/// conditions change, with a cooldown so it doesn't thrash every bet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveState {
    pub candidates: Vec<Strategy>,
    pub rules: Vec<AdaptiveRule>,
    pub active_index: usize,
    pub cooldown_bets: u64,
    bets_since_switch: u64,
    #[serde(skip)]
    last_switch: Option<(String, String)>,
}

impl AdaptiveState {
    pub fn new(candidates: Vec<Strategy>, rules: Vec<AdaptiveRule>, cooldown_bets: u64) -> Self {
        Self {
            candidates,
            rules,
            active_index: 0,
            cooldown_bets,
            bets_since_switch: 0,
            last_switch: None,
        }
    }

    /// Drains the from/to pair recorded by the most recent switch, if any —
    /// the session loop reads this once per iteration to emit a
    /// `StrategySwitch` event.
    pub fn take_last_switch(&mut self) -> Option<(String, String)> {
        self.last_switch.take()
    }

    fn maybe_switch(&mut self, ctx: &DecisionContext<'_>) {
        if self.bets_since_switch < self.cooldown_bets || self.candidates.len() < 2 {
            return;
        }
        let confidence = self.candidates[self.active_index].metrics.confidence;
        for rule in &self.rules {
            if rule.target_index == self.active_index || rule.target_index >= self.candidates.len() {
                continue;
            }
            if rule.condition.matches(ctx, confidence) {
                let from = self.candidates[self.active_index].name().to_string();
                let to = self.candidates[rule.target_index].name().to_string();
                self.active_index = rule.target_index;
                self.bets_since_switch = 0;
                self.last_switch = Some((from, to));
                return;
            }
        }
    }

    pub fn decide(&mut self, ctx: &DecisionContext<'_>) -> BetDecision {
        if self.candidates.is_empty() {
            return BetDecision::bet(Money::ZERO, ctx.base_multiplier, ctx.default_bet_type, 0.0);
        }
        self.maybe_switch(ctx);
        self.candidates[self.active_index].decide(ctx)
    }

    pub fn update(&mut self, result: &BetResult) {
        if self.candidates.is_empty() {
            return;
        }
        self.bets_since_switch += 1;
        let decision = BetDecision::bet(result.bet, result.multiplier, result.bet_type, 0.5);
        self.candidates[self.active_index].update(&decision, result);
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        if let Some(active) = self.candidates.get_mut(self.active_index) {
            active.on_alt_action(action);
        }
    }

    pub fn reset(&mut self) {
        self.active_index = 0;
        self.bets_since_switch = 0;
        self.last_switch = None;
        for candidate in &mut self.candidates {
            candidate.reset();
        }
    }

    pub fn genome(&self) -> Genome {
        let mut genome: Genome = HashMap::new();
        genome.insert("active_index".to_string(), json!(self.active_index));
        genome.insert("cooldown_bets".to_string(), json!(self.cooldown_bets));
        genome.insert("candidate_count".to_string(), json!(self.candidates.len()));
        for (i, candidate) in self.candidates.iter().enumerate() {
            genome.insert(format!("candidate_{i}"), json!(candidate.genome()));
        }
        genome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::FlatState;
    use crate::strategy::StrategyKind;
    use chrono::Utc;
    use diceforge_models::bet::BetType;
    use diceforge_models::game_state::GameState;
    use rust_decimal_macros::dec;

    fn flat(bet: rust_decimal::Decimal) -> Strategy {
        Strategy::new(StrategyKind::Flat(FlatState::new(Money::new(bet), 2.0, BetType::Under)))
    }

    fn ctx(gs: &GameState) -> DecisionContext<'_> {
        DecisionContext {
            game_state: gs,
            base_bet: Money::new(dec!(1)),
            base_multiplier: 2.0,
            min_bet: Money::new(dec!(0.01)),
            max_bet: Money::new(dec!(1000)),
            default_bet_type: BetType::Under,
        }
    }

    fn loss_result() -> BetResult {
        BetResult {
            roll: dec!(90.0),
            threshold: 49.5,
            won: false,
            bet: Money::new(dec!(1)),
            multiplier: 2.0,
            payout: Money::ZERO,
            bet_type: BetType::Under,
            server_seed_hash: "h".into(),
            client_seed: "c".into(),
            nonce: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn switches_after_cooldown_when_condition_matches() {
        let mut gs = GameState::new(Money::new(dec!(100)), 20);
        for _ in 0..5 {
            gs.record_bet(&loss_result(), false);
        }

        let rules = vec![AdaptiveRule {
            condition: AdaptiveCondition::ConsecutiveLosses(3),
            target_index: 1,
        }];
        let mut adaptive = AdaptiveState::new(vec![flat(dec!(1)), flat(dec!(2))], rules, 0);

        adaptive.decide(&ctx(&gs));
        assert_eq!(adaptive.active_index, 1);
        assert!(adaptive.take_last_switch().is_some());
    }

    #[test]
    fn cooldown_blocks_immediate_switch_back() {
        let mut gs = GameState::new(Money::new(dec!(100)), 20);
        for _ in 0..5 {
            gs.record_bet(&loss_result(), false);
        }

        let rules = vec![AdaptiveRule {
            condition: AdaptiveCondition::ConsecutiveLosses(3),
            target_index: 1,
        }];
        let mut adaptive = AdaptiveState::new(vec![flat(dec!(1)), flat(dec!(2))], rules, 10);

        adaptive.decide(&ctx(&gs));
        assert_eq!(adaptive.active_index, 0);
    }
}
