use chrono::Utc;
use diceforge_engine::event_bus::EventBus;
use diceforge_engine::game::Game;
use diceforge_engine::session_loop::run_session;
use diceforge_models::events::{Event, EventKind};
use diceforge_models::session::{SessionConfig, SessionState};
use diceforge_models::vault::{TransferOutcome, TransferTrigger, Vault};
use diceforge_oracle::roll::RollOracle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::plan::{Plan, PlanResult, RunSpec, SessionOutcome};

fn publish_transfer(bus: &mut EventBus, session_id: uuid::Uuid, outcome: TransferOutcome, to_vault: bool) {
    if !outcome.executed {
        return;
    }
    bus.publish(Event::new(
        Some(session_id),
        EventKind::VaultTransfer {
            trigger: TransferTrigger::Auto,
            amount: outcome.amount,
            to_vault,
        },
    ));
}

fn run_one(spec: RunSpec, cancel: CancellationToken) -> SessionOutcome {
    let session_config = SessionConfig {
        stop_loss_ratio: spec.session_config.stop_loss_ratio,
        take_profit_ratio: spec.session_config.take_profit_ratio,
        max_bets: spec.session_config.max_bets,
        min_bet: spec.session_config.min_bet,
    };
    let mut vault = Vault::new(
        spec.initial_balance,
        spec.vault_ratio,
        spec.working_ratio,
        spec.max_transfers_per_day,
    );
    let working_balance_before = vault.create_session();
    let mut session = SessionState::new(session_config, working_balance_before, spec.history_window);
    let mut game = Game::with_multiplier_bounds(
        RollOracle::new(spec.server_seed, spec.client_seed),
        spec.min_multiplier,
        spec.max_multiplier,
    );
    let mut strategy = spec.strategy;
    let mut bus = EventBus::new(diceforge_engine::event_bus::DEFAULT_RING_CAPACITY);

    let summary = run_session(
        spec.session_id,
        &mut session,
        &mut game,
        &mut strategy,
        spec.base_bet,
        spec.base_multiplier,
        spec.default_bet_type,
        &mut bus,
        &|| cancel.is_cancelled(),
    );

    vault.close_session(summary.final_balance);
    let session_profit = summary.final_balance - working_balance_before;
    let now = Utc::now();
    let replenished = vault.replenish(now, TransferTrigger::Auto);
    publish_transfer(&mut bus, spec.session_id, replenished, false);
    let skimmed = vault.skim(now, session_profit.max(diceforge_models::money::Money::ZERO), TransferTrigger::Auto);
    publish_transfer(&mut bus, spec.session_id, skimmed, true);

    SessionOutcome {
        session_id: summary.session_id,
        label: spec.label,
        stop_reason: format!("{:?}", summary.stop_reason),
        initial_balance: spec.initial_balance,
        final_balance: vault.total_capital(),
        bets_count: summary.bets_count,
        wins_count: summary.wins_count,
        losses_count: summary.losses_count,
        max_drawdown: summary.max_drawdown,
        error: summary.error.map(|e| e.to_string()),
    }
}

/// Run every spec in a plan to completion.
///
/// Below `auto_parallel_threshold` sessions run serially on the caller's
/// task; at or above it, each session is handed to its own
/// `spawn_blocking` worker (the session loop is CPU-bound synchronous
/// code, never `.await`ing inside), and results are collected off a single
/// `mpsc` channel by one aggregator task. `cancel` is checked between bets,
/// never mid-bet, so a cancelled run still ends on a clean, auditable
/// boundary.
pub async fn run_plan(plan: Plan, cancel: CancellationToken) -> PlanResult {
    let parallel = plan.should_run_parallel();
    info!(
        sessions = plan.specs.len(),
        parallel, "dispatching plan '{}'", plan.name
    );

    let outcomes = if parallel {
        run_parallel(plan.specs, cancel).await
    } else {
        plan.specs
            .into_iter()
            .map(|spec| run_one(spec, cancel.clone()))
            .collect()
    };

    PlanResult {
        plan_name: plan.name,
        outcomes,
    }
}

async fn run_parallel(specs: Vec<RunSpec>, cancel: CancellationToken) -> Vec<SessionOutcome> {
    let (tx, mut rx) = mpsc::channel(specs.len().max(1));
    let total = specs.len();

    for spec in specs {
        let tx = tx.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = run_one(spec, cancel);
            if tx.blocking_send(outcome).is_err() {
                warn!("aggregator dropped before a session outcome could be delivered");
            }
        });
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(total);
    while let Some(outcome) = rx.recv().await {
        outcomes.push(outcome);
    }
    outcomes
}
