use std::collections::HashMap;

use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::DecisionContext;
use crate::strategy::Strategy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombineMode {
    /// Unweighted mean of every member's bet amount and multiplier.
    Average,
    /// Weighted mean; weights are normalised and zero-padded/truncated to
    /// match the member count.
    Weighted(Vec<f64>),
    /// Bet only when every member proposes the same bet direction.
    Consensus,
    /// Take the largest proposed bet amount.
    Aggressive,
    /// Take the smallest proposed bet amount.
    Conservative,
    /// Use exactly one member's decision per call, cycling round-robin.
    Rotate,
}

/// Runs several strategies side by side and folds their decisions into one,
/// per `CombineMode`. Every member still receives `update()` so its own
/// progression stays in sync regardless of whether its decision was the one
/// ultimately used.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeState {
    pub members: Vec<Strategy>,
    pub mode: CombineMode,
    rotate_index: usize,
    #[serde(skip)]
    last_proposals: Vec<BetDecision>,
}

impl CompositeState {
    pub fn new(members: Vec<Strategy>, mode: CombineMode) -> Self {
        Self {
            members,
            mode,
            rotate_index: 0,
            last_proposals: Vec::new(),
        }
    }

    pub fn decide(&mut self, ctx: &DecisionContext<'_>) -> BetDecision {
        if self.members.is_empty() {
            return BetDecision::bet(Money::ZERO, ctx.base_multiplier, ctx.default_bet_type, 0.0);
        }

        let proposals: Vec<BetDecision> = self.members.iter_mut().map(|m| m.decide(ctx)).collect();
        self.last_proposals = proposals.clone();

        match &self.mode {
            CombineMode::Average => average(&proposals),
            CombineMode::Weighted(weights) => weighted(&proposals, weights),
            CombineMode::Consensus => consensus(&proposals, ctx),
            CombineMode::Aggressive => extreme(&proposals, true),
            CombineMode::Conservative => extreme(&proposals, false),
            CombineMode::Rotate => {
                let chosen = proposals[self.rotate_index % proposals.len()].clone();
                self.rotate_index = (self.rotate_index + 1) % self.members.len().max(1);
                chosen
            }
        }
    }

    /// Every member is updated with the result of the round it just
    /// proposed into, whether or not its proposal was the one ultimately
    /// used — each progression's internal state must track its own would-be
    /// outcome to stay coherent across rounds.
    pub fn update(&mut self, result: &BetResult) {
        let proposals = std::mem::take(&mut self.last_proposals);
        for (member, decision) in self.members.iter_mut().zip(proposals.iter()) {
            member.update(decision, result);
        }
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        for member in &mut self.members {
            member.on_alt_action(action);
        }
    }

    pub fn reset(&mut self) {
        self.rotate_index = 0;
        for member in &mut self.members {
            member.reset();
        }
    }

    pub fn genome(&self) -> Genome {
        let mut genome: Genome = HashMap::new();
        genome.insert("mode".to_string(), json!(format!("{:?}", self.mode)));
        genome.insert("member_count".to_string(), json!(self.members.len()));
        for (i, member) in self.members.iter().enumerate() {
            genome.insert(format!("member_{i}"), json!(member.genome()));
        }
        genome
    }
}

fn average(proposals: &[BetDecision]) -> BetDecision {
    let active: Vec<&BetDecision> = proposals.iter().filter(|d| !d.skip).collect();
    if active.is_empty() {
        return proposals[0].clone();
    }
    let amount: Money = active.iter().map(|d| d.amount).sum::<Money>().div_rounded(
        rust_decimal::Decimal::from(active.len() as u64),
    );
    let multiplier = active.iter().map(|d| d.multiplier).sum::<f64>() / active.len() as f64;
    let confidence = active.iter().map(|d| d.confidence).sum::<f64>() / active.len() as f64;
    BetDecision::bet(amount, multiplier, majority_bet_type(&active), confidence)
}

fn weighted(proposals: &[BetDecision], weights: &[f64]) -> BetDecision {
    let total_weight: f64 = weights.iter().take(proposals.len()).sum::<f64>().max(f64::EPSILON);
    let mut amount = 0.0;
    let mut multiplier = 0.0;
    let mut confidence = 0.0;
    for (i, d) in proposals.iter().enumerate() {
        let w = weights.get(i).copied().unwrap_or(0.0) / total_weight;
        amount += d.amount.to_f64_lossy() * w;
        multiplier += d.multiplier * w;
        confidence += d.confidence * w;
    }
    let amount = Money::from_f64_lossy(amount).unwrap_or(Money::ZERO);
    BetDecision::bet(amount, multiplier, majority_bet_type(&proposals.iter().collect::<Vec<_>>()), confidence)
}

fn consensus(proposals: &[BetDecision], ctx: &DecisionContext<'_>) -> BetDecision {
    let first_type = proposals[0].bet_type;
    if proposals.iter().all(|d| d.bet_type == first_type && !d.skip) {
        average(proposals)
    } else {
        BetDecision::bet(Money::ZERO, ctx.base_multiplier, ctx.default_bet_type, 0.1)
            .with_meta("consensus", json!(false))
    }
}

fn extreme(proposals: &[BetDecision], aggressive: bool) -> BetDecision {
    let active: Vec<&BetDecision> = proposals.iter().filter(|d| !d.skip).collect();
    if active.is_empty() {
        return proposals[0].clone();
    }
    let chosen = if aggressive {
        active.iter().max_by_key(|d| d.amount).unwrap()
    } else {
        active.iter().min_by_key(|d| d.amount).unwrap()
    };
    (*chosen).clone()
}

fn majority_bet_type(proposals: &[&BetDecision]) -> BetType {
    let under = proposals.iter().filter(|d| d.bet_type == BetType::Under).count();
    let over = proposals.len() - under;
    if under >= over {
        BetType::Under
    } else {
        BetType::Over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::FlatState;
    use crate::strategy::StrategyKind;
    use diceforge_models::game_state::GameState;
    use rust_decimal_macros::dec;

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

    fn flat(bet: rust_decimal::Decimal, bet_type: BetType) -> Strategy {
        Strategy::new(StrategyKind::Flat(FlatState::new(Money::new(bet), 2.0, bet_type)))
    }

    #[test]
    fn average_splits_the_difference() {
        let gs = GameState::new(Money::new(dec!(100)), 20);
        let mut composite = CompositeState::new(
            vec![flat(dec!(1), BetType::Under), flat(dec!(3), BetType::Under)],
            CombineMode::Average,
        );
        let decision = composite.decide(&ctx(&gs));
        assert_eq!(decision.amount, Money::new(dec!(2)));
    }

    #[test]
    fn aggressive_takes_the_largest_bet() {
        let gs = GameState::new(Money::new(dec!(100)), 20);
        let mut composite = CompositeState::new(
            vec![flat(dec!(1), BetType::Under), flat(dec!(5), BetType::Under)],
            CombineMode::Aggressive,
        );
        let decision = composite.decide(&ctx(&gs));
        assert_eq!(decision.amount, Money::new(dec!(5)));
    }

    #[test]
    fn conservative_takes_the_smallest_bet() {
        let gs = GameState::new(Money::new(dec!(100)), 20);
        let mut composite = CompositeState::new(
            vec![flat(dec!(1), BetType::Under), flat(dec!(5), BetType::Under)],
            CombineMode::Conservative,
        );
        let decision = composite.decide(&ctx(&gs));
        assert_eq!(decision.amount, Money::new(dec!(1)));
    }

    #[test]
    fn consensus_skips_on_disagreement() {
        let gs = GameState::new(Money::new(dec!(100)), 20);
        let mut composite = CompositeState::new(
            vec![flat(dec!(1), BetType::Under), flat(dec!(1), BetType::Over)],
            CombineMode::Consensus,
        );
        let decision = composite.decide(&ctx(&gs));
        assert_eq!(decision.amount, Money::ZERO);
    }

    #[test]
    fn rotate_cycles_through_members() {
        let gs = GameState::new(Money::new(dec!(100)), 20);
        let mut composite = CompositeState::new(
            vec![flat(dec!(1), BetType::Under), flat(dec!(5), BetType::Under)],
            CombineMode::Rotate,
        );
        let first = composite.decide(&ctx(&gs)).amount;
        let second = composite.decide(&ctx(&gs)).amount;
        assert_ne!(first, second);
    }
}
