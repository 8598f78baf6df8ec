mod config;

use anyhow::{Context, Result};
use config::{AppConfig, StrategyPreset};
use diceforge_models::bet::BetType;
use diceforge_models::money::Money;
use diceforge_models::session::SessionConfig;
use diceforge_oracle::roll::RollOracle;
use diceforge_runner::compare::summarize;
use diceforge_runner::plan::{Plan, RunSpec};
use diceforge_runner::runner::Runner;
use diceforge_strategy::presets;
use rand::rngs::OsRng;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const STARTING_CAPITAL: &str = "100.0";
const HISTORY_WINDOW: usize = 20;
const DEFAULT_BASE_BET: &str = "0.01";
const DEFAULT_MULTIPLIER: f64 = 2.0;

fn strategy_for(
    preset: StrategyPreset,
    base_bet: Money,
    min_bet: Money,
    parking: &config::ParkingConfig,
) -> diceforge_strategy::strategy::Strategy {
    if !parking.enabled {
        return match preset {
            StrategyPreset::Conservative => presets::conservative(base_bet, DEFAULT_MULTIPLIER),
            StrategyPreset::Moderate => presets::moderate_plain(base_bet, base_bet, DEFAULT_MULTIPLIER),
            StrategyPreset::Aggressive => presets::aggressive_plain(base_bet, 8, DEFAULT_MULTIPLIER),
            StrategyPreset::Experimental => presets::experimental_plain(base_bet, DEFAULT_MULTIPLIER),
        };
    }

    let options = parking.to_options();
    match preset {
        StrategyPreset::Conservative => presets::conservative(base_bet, DEFAULT_MULTIPLIER),
        StrategyPreset::Moderate => presets::moderate_with_parking(base_bet, base_bet, DEFAULT_MULTIPLIER, min_bet, options),
        StrategyPreset::Aggressive => presets::aggressive_with_parking(base_bet, 8, DEFAULT_MULTIPLIER, min_bet, options),
        StrategyPreset::Experimental => presets::experimental_with_parking(base_bet, DEFAULT_MULTIPLIER, min_bet, options),
    }
}

fn build_plan(config: &AppConfig) -> Plan {
    let mut rng = OsRng;
    let initial_balance = Money::parse(STARTING_CAPITAL).expect("starting capital literal parses");
    let min_bet = Money::new(config.game.min_bet);
    let base_bet = Money::parse(DEFAULT_BASE_BET).expect("default bet literal parses");
    let session_config = SessionConfig {
        stop_loss_ratio: -0.9,
        take_profit_ratio: 1.0,
        max_bets: u64::from(config.simulation.default_sessions) * 100,
        min_bet,
    };

    let specs = (0..config.simulation.default_sessions)
        .map(|i| {
            let mut spec = RunSpec::with_defaults(
                Uuid::new_v4(),
                format!("session-{i}"),
                RollOracle::generate_server_seed(&mut rng),
                Uuid::new_v4().to_string(),
                initial_balance,
                session_config.clone(),
                base_bet,
                DEFAULT_MULTIPLIER,
                BetType::Under,
                strategy_for(config.strategy_preset, base_bet, min_bet, &config.parking),
                HISTORY_WINDOW,
            );
            spec.min_multiplier = config.game.min_multiplier;
            spec.max_multiplier = config.game.max_multiplier;
            spec.vault_ratio = config.vault.vault_ratio;
            spec.working_ratio = config.vault.working_ratio;
            spec.max_transfers_per_day = config.vault.max_transfers_per_day;
            spec
        })
        .collect();

    let mut plan = Plan::new("default-run", specs);
    plan.auto_parallel_threshold = config.simulation.auto_parallel_threshold as usize;
    plan
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "diceforge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = AppConfig::load().context("failed to load configuration")?;
    app_config.validate().context("configuration failed validation")?;
    info!(
        preset = ?app_config.strategy_preset,
        sessions = app_config.simulation.default_sessions,
        "configuration loaded"
    );

    let runner = Runner::new(
        "checkpoints",
        app_config.simulation.checkpoint_interval,
        app_config.simulation.max_checkpoint_age_days,
    );
    let plan = build_plan(&app_config);
    let parallel = plan.should_run_parallel();
    info!(sessions = plan.specs.len(), parallel, "running plan");

    let result = runner.run_plan(plan, CancellationToken::new()).await?;
    let summary = summarize(&result);

    info!(
        plan = %summary.plan_name,
        sessions = summary.session_count,
        mean_roi = summary.mean_roi,
        best_roi = summary.best_roi,
        worst_roi = summary.worst_roi,
        fatal_errors = summary.fatal_error_count,
        "plan complete"
    );
    println!(
        "{}: {} sessions, mean ROI {:.4}, best {:.4}, worst {:.4}, fatal errors {}",
        summary.plan_name,
        summary.session_count,
        summary.mean_roi,
        summary.best_roi,
        summary.worst_roi,
        summary.fatal_error_count
    );

    Ok(())
}
