use diceforge_engine::game::{DEFAULT_MAX_MULTIPLIER, DEFAULT_MIN_MULTIPLIER};
use diceforge_models::bet::BetType;
use diceforge_models::money::Money;
use diceforge_models::session::SessionConfig;
use diceforge_models::vault::{DEFAULT_MAX_TRANSFERS_PER_DAY, DEFAULT_VAULT_RATIO, DEFAULT_WORKING_RATIO};
use diceforge_strategy::strategy::Strategy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_AUTO_PARALLEL_THRESHOLD: usize = 50;

/// Everything needed to run exactly one session, independent of any other
/// session in the same plan.
#[derive(Clone)]
pub struct RunSpec {
    pub session_id: Uuid,
    pub label: String,
    pub server_seed: String,
    pub client_seed: String,
    pub initial_balance: Money,
    pub session_config: SessionConfig,
    pub base_bet: Money,
    pub base_multiplier: f64,
    pub default_bet_type: BetType,
    pub strategy: Strategy,
    pub history_window: usize,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    pub vault_ratio: f64,
    pub working_ratio: f64,
    pub max_transfers_per_day: u32,
}

impl RunSpec {
    /// Multiplier bounds and vault split default to the spec's own
    /// defaults; callers that want config-driven values set the fields
    /// directly after construction.
    pub fn with_defaults(
        session_id: Uuid,
        label: String,
        server_seed: String,
        client_seed: String,
        initial_balance: Money,
        session_config: SessionConfig,
        base_bet: Money,
        base_multiplier: f64,
        default_bet_type: BetType,
        strategy: Strategy,
        history_window: usize,
    ) -> Self {
        Self {
            session_id,
            label,
            server_seed,
            client_seed,
            initial_balance,
            session_config,
            base_bet,
            base_multiplier,
            default_bet_type,
            strategy,
            history_window,
            min_multiplier: DEFAULT_MIN_MULTIPLIER,
            max_multiplier: DEFAULT_MAX_MULTIPLIER,
            vault_ratio: DEFAULT_VAULT_RATIO,
            working_ratio: DEFAULT_WORKING_RATIO,
            max_transfers_per_day: DEFAULT_MAX_TRANSFERS_PER_DAY,
        }
    }
}

/// A batch of sessions to run together. Below `auto_parallel_threshold`
/// sessions the runner dispatches serially on the calling task (spawning a
/// worker pool for a handful of sessions would lose to its own overhead);
/// at or above it, every session runs on its own blocking worker.
pub struct Plan {
    pub name: String,
    pub specs: Vec<RunSpec>,
    pub auto_parallel_threshold: usize,
}

impl Plan {
    pub fn new(name: impl Into<String>, specs: Vec<RunSpec>) -> Self {
        Self {
            name: name.into(),
            specs,
            auto_parallel_threshold: DEFAULT_AUTO_PARALLEL_THRESHOLD,
        }
    }

    pub fn should_run_parallel(&self) -> bool {
        self.specs.len() >= self.auto_parallel_threshold
    }
}

/// What a single completed (or errored) session contributes to a plan's
/// result, serialisable for checkpointing and JSONL logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub label: String,
    pub stop_reason: String,
    pub initial_balance: Money,
    pub final_balance: Money,
    pub bets_count: u64,
    pub wins_count: u64,
    pub losses_count: u64,
    pub max_drawdown: f64,
    pub error: Option<String>,
}

impl SessionOutcome {
    /// Return on initial balance; `0.0` when the session started from nothing
    /// (a zero-capital session can't meaningfully report a ratio).
    pub fn roi(&self) -> f64 {
        let start = self.initial_balance.to_f64_lossy();
        if start == 0.0 {
            return 0.0;
        }
        (self.final_balance.to_f64_lossy() - start) / start
    }
}

pub struct PlanResult {
    pub plan_name: String,
    pub outcomes: Vec<SessionOutcome>,
}

impl PlanResult {
    pub fn total_pnl(&self) -> Money {
        self.outcomes.iter().map(|o| o.final_balance).sum()
    }

    pub fn fatal_errors(&self) -> Vec<&SessionOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some()).collect()
    }
}
