use diceforge_engine::game::{DEFAULT_MAX_MULTIPLIER, DEFAULT_MIN_MULTIPLIER};
use diceforge_models::bet::BetType;
use diceforge_models::money::Money;
use diceforge_models::session::SessionConfig;
use diceforge_models::vault::{DEFAULT_MAX_TRANSFERS_PER_DAY, DEFAULT_VAULT_RATIO, DEFAULT_WORKING_RATIO};
use diceforge_strategy::strategy::Strategy;
use uuid::Uuid;

use crate::plan::{Plan, RunSpec};

/// A cartesian sweep over `base_bet` x `multiplier`, every other field held
/// fixed. `strategy_template` is cloned per combination rather than shared —
/// each [`RunSpec`] needs a strategy with its own progression/metrics state,
/// not one that the sweep's sessions would contend over.
pub struct SweepSpec {
    pub label_prefix: String,
    pub server_seed: String,
    pub client_seed_prefix: String,
    pub initial_balance: Money,
    pub session_config: SessionConfig,
    pub base_bets: Vec<Money>,
    pub multipliers: Vec<f64>,
    pub default_bet_type: BetType,
    pub strategy_template: Strategy,
    pub history_window: usize,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    pub vault_ratio: f64,
    pub working_ratio: f64,
    pub max_transfers_per_day: u32,
}

impl SweepSpec {
    pub fn generate(&self) -> Vec<RunSpec> {
        let mut specs = Vec::with_capacity(self.base_bets.len() * self.multipliers.len());
        for base_bet in &self.base_bets {
            for multiplier in &self.multipliers {
                let label = format!("{}_bet{}_x{}", self.label_prefix, base_bet, multiplier);
                specs.push(RunSpec {
                    session_id: Uuid::new_v4(),
                    client_seed: format!("{}-{}", self.client_seed_prefix, label),
                    label,
                    server_seed: self.server_seed.clone(),
                    initial_balance: self.initial_balance,
                    session_config: self.session_config.clone(),
                    base_bet: *base_bet,
                    base_multiplier: *multiplier,
                    default_bet_type: self.default_bet_type,
                    strategy: self.strategy_template.clone(),
                    history_window: self.history_window,
                    min_multiplier: self.min_multiplier,
                    max_multiplier: self.max_multiplier,
                    vault_ratio: self.vault_ratio,
                    working_ratio: self.working_ratio,
                    max_transfers_per_day: self.max_transfers_per_day,
                });
            }
        }
        specs
    }

    pub fn into_plan(self, name: impl Into<String>) -> Plan {
        Plan::new(name, self.generate())
    }
}
