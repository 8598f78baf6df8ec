//! Resuming a plan from an intermediate checkpoint must yield the same
//! per-session outcomes as running the whole plan straight through, since
//! sessions never share state and each keeps its own seeds.

use diceforge_models::bet::BetType;
use diceforge_models::money::Money;
use diceforge_models::session::SessionConfig;
use diceforge_runner::plan::{Plan, RunSpec};
use diceforge_runner::runner::Runner;
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
        max_bets: 200,
        min_bet,
    };

    (0..count)
        .map(|i| RunSpec::with_defaults(
            Uuid::new_v4(),
            format!("resume-{i}"),
            format!("resume-seed-{i}"),
            format!("resume-client-{i}"),
            Money::new(dec!(100)),
            session_config.clone(),
            base_bet,
            2.0,
            BetType::Under,
            presets::aggressive(base_bet, 6, 2.0, min_bet),
            20,
        ))
        .collect()
}

#[tokio::test]
async fn resume_from_an_intermediate_checkpoint_matches_a_straight_run() {
    let all_specs = specs(6);

    let straight_dir = tempfile::tempdir().unwrap();
    let straight_runner = Runner::new(straight_dir.path(), 100, 30);
    let straight_plan = Plan::new("idempotence-plan", all_specs.clone());
    let mut straight_result = straight_runner.run_plan(straight_plan, CancellationToken::new()).await.unwrap();

    let resumed_dir = tempfile::tempdir().unwrap();
    let resumed_runner = Runner::new(resumed_dir.path(), 1, 30);
    let first_half = Plan::new("idempotence-plan", all_specs[..3].to_vec());
    resumed_runner.run_plan(first_half, CancellationToken::new()).await.unwrap();

    let full_plan_again = Plan::new("idempotence-plan", all_specs);
    let mut resumed_result = resumed_runner.resume_checkpoint(full_plan_again, CancellationToken::new()).await.unwrap();

    straight_result.outcomes.sort_by_key(|o| o.session_id);
    resumed_result.outcomes.sort_by_key(|o| o.session_id);

    assert_eq!(straight_result.outcomes.len(), resumed_result.outcomes.len());
    for (straight, resumed) in straight_result.outcomes.iter().zip(resumed_result.outcomes.iter()) {
        assert_eq!(straight.session_id, resumed.session_id);
        assert_eq!(straight.final_balance, resumed.final_balance);
        assert_eq!(straight.bets_count, resumed.bets_count);
        assert_eq!(straight.stop_reason, resumed.stop_reason);
    }
}
