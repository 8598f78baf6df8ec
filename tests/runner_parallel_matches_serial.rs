//! Running the same plan serially and in parallel must produce the same
//! per-session outcomes, since no session shares mutable state with any
//! other (each gets its own oracle, event bus, and strategy clone).

use diceforge_models::bet::BetType;
use diceforge_models::money::Money;
use diceforge_models::session::SessionConfig;
use diceforge_runner::dispatch::run_plan;
use diceforge_runner::plan::{Plan, RunSpec};
use diceforge_strategy::presets;
use rust_decimal_macros::dec;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn specs(count: usize) -> Vec<RunSpec> {
    let base_bet = Money::new(dec!(0.01));
    let min_bet = Money::new(dec!(0.00015));
    let session_config = SessionConfig {
        stop_loss_ratio: -0.8,
        take_profit_ratio: 0.8,
        max_bets: 300,
        min_bet,
    };

    (0..count)
        .map(|i| RunSpec::with_defaults(
            Uuid::new_v4(),
            format!("equivalence-{i}"),
            format!("parallel-equals-serial-seed-{i}"),
            format!("client-{i}"),
            Money::new(dec!(100)),
            session_config.clone(),
            base_bet,
            2.0,
            BetType::Under,
            presets::moderate(base_bet, base_bet, 2.0, min_bet),
            20,
        ))
        .collect()
}

#[tokio::test]
async fn parallel_and_serial_dispatch_produce_identical_outcomes() {
    let specs = specs(80);

    let mut serial_plan = Plan::new("equivalence-serial", specs.clone());
    serial_plan.auto_parallel_threshold = usize::MAX;
    let mut parallel_plan = Plan::new("equivalence-parallel", specs);
    parallel_plan.auto_parallel_threshold = 1;

    assert!(!serial_plan.should_run_parallel());
    assert!(parallel_plan.should_run_parallel());

    let mut serial_result = run_plan(serial_plan, CancellationToken::new()).await;
    let mut parallel_result = run_plan(parallel_plan, CancellationToken::new()).await;

    serial_result.outcomes.sort_by_key(|o| o.session_id);
    parallel_result.outcomes.sort_by_key(|o| o.session_id);

    assert_eq!(serial_result.outcomes.len(), parallel_result.outcomes.len());
    for (serial, parallel) in serial_result.outcomes.iter().zip(parallel_result.outcomes.iter()) {
        assert_eq!(serial.session_id, parallel.session_id);
        assert_eq!(serial.final_balance, parallel.final_balance);
        assert_eq!(serial.bets_count, parallel.bets_count);
        assert_eq!(serial.wins_count, parallel.wins_count);
        assert_eq!(serial.losses_count, parallel.losses_count);
        assert_eq!(serial.stop_reason, parallel.stop_reason);
    }
}
