use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::DecisionContext;

/// Bets the same amount every round. The baseline every other progression is
/// measured against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatState {
    pub base_bet: Money,
    pub multiplier: f64,
    pub bet_type: BetType,
}

impl FlatState {
    pub fn new(base_bet: Money, multiplier: f64, bet_type: BetType) -> Self {
        Self {
            base_bet,
            multiplier,
            bet_type,
        }
    }

    pub fn decide(&self, ctx: &DecisionContext<'_>) -> BetDecision {
        BetDecision::bet(self.base_bet, self.multiplier, self.bet_type, ctx_confidence(ctx))
    }

    pub fn update(&mut self, _result: &BetResult) {}

    pub fn on_alt_action(&mut self, action: AltAction) {
        if action == AltAction::ToggleBetType {
            self.bet_type = self.bet_type.flipped();
        }
    }

    pub fn reset(&mut self) {}

    pub fn genome(&self) -> Genome {
        [
            ("base_bet".to_string(), json!(self.base_bet.to_string())),
            ("multiplier".to_string(), json!(self.multiplier)),
            ("bet_type".to_string(), json!(format!("{:?}", self.bet_type))),
        ]
        .into_iter()
        .collect()
    }

    pub fn from_genome(genome: &Genome) -> Option<Self> {
        Some(Self {
            base_bet: Money::parse(genome.get("base_bet")?.as_str()?).ok()?,
            multiplier: genome.get("multiplier")?.as_f64()?,
            bet_type: parse_bet_type(genome.get("bet_type")?.as_str()?)?,
        })
    }
}

pub(crate) fn ctx_confidence(_ctx: &DecisionContext<'_>) -> f64 {
    1.0
}

pub(crate) fn parse_bet_type(s: &str) -> Option<BetType> {
    match s {
        "Under" => Some(BetType::Under),
        "Over" => Some(BetType::Over),
        _ => None,
    }
}
