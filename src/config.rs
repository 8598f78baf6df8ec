use config::{Config, ConfigError, Environment, File};
use diceforge_models::bet::BetType;
use diceforge_models::error::EngineError;
use diceforge_models::money::Money;
use diceforge_strategy::parking::ParkingOptions;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub game: GameConfig,
    pub vault: VaultConfig,
    pub strategy_preset: StrategyPreset,
    pub parking: ParkingConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub default_sessions: u32,
    pub parallel_workers: u32,
    pub auto_parallel_threshold: u32,
    pub checkpoint_interval: u32,
    pub max_checkpoint_age_days: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfig {
    pub house_edge: f64,
    pub min_bet: Decimal,
    pub max_bet: Decimal,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VaultConfig {
    pub vault_ratio: f64,
    pub working_ratio: f64,
    pub max_transfers_per_day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPreset {
    Conservative,
    Moderate,
    Aggressive,
    Experimental,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParkingConfig {
    pub enabled: bool,
    pub max_toggles_before_bet: u32,
    pub parking_bet_amount: Decimal,
    pub parking_target: f64,
    pub parking_bet_type: BetType,
    pub auto_seed_rotation_after: u32,
    pub parking_on_consecutive_losses: u32,
    pub parking_on_drawdown_percent: f64,
}

impl ParkingConfig {
    /// Translates the loaded `[parking]` section into the shape
    /// `ParkingState` actually consumes.
    pub fn to_options(self) -> ParkingOptions {
        ParkingOptions {
            consecutive_losses_trigger: u64::from(self.parking_on_consecutive_losses),
            drawdown_trigger: self.parking_on_drawdown_percent,
            max_toggles_before_bet: self.max_toggles_before_bet,
            auto_rotation_threshold: self.auto_seed_rotation_after,
            parking_bet_amount: Money::new(self.parking_bet_amount),
            parking_target: self.parking_target,
            parking_bet_type: self.parking_bet_type,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let built = Config::builder()
            .set_default("simulation.default_sessions", 100)?
            .set_default("simulation.parallel_workers", 8)?
            .set_default("simulation.auto_parallel_threshold", 50)?
            .set_default("simulation.checkpoint_interval", 25)?
            .set_default("simulation.max_checkpoint_age_days", 30)?
            .set_default("game.house_edge", 0.01)?
            .set_default("game.min_bet", "0.00015")?
            .set_default("game.max_bet", "1000.0")?
            .set_default("game.min_multiplier", 1.01)?
            .set_default("game.max_multiplier", 99.0)?
            .set_default("vault.vault_ratio", 0.85)?
            .set_default("vault.working_ratio", 0.15)?
            .set_default("vault.max_transfers_per_day", 2)?
            .set_default("strategy_preset", "conservative")?
            .set_default("parking.enabled", true)?
            .set_default("parking.max_toggles_before_bet", 3)?
            .set_default("parking.parking_bet_amount", "0.00015")?
            .set_default("parking.parking_target", 98.0)?
            .set_default("parking.parking_bet_type", "Under")?
            .set_default("parking.auto_seed_rotation_after", 1000)?
            .set_default("parking.parking_on_consecutive_losses", 5)?
            .set_default("parking.parking_on_drawdown_percent", 0.10)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::new().separator("_"))
            .build()?;

        built.try_deserialize()
    }

    /// Validate cross-field invariants the `config` crate's own schema
    /// can't express, surfaced as a structured diagnostic with a suggested
    /// remediation before any session runs.
    pub fn validate(&self) -> Result<(), EngineError> {
        let ratio_sum = self.vault.vault_ratio + self.vault.working_ratio;
        if (ratio_sum - 1.0).abs() > 1e-9 {
            return Err(EngineError::config_invalid(
                "vault.vault_ratio + vault.working_ratio",
                ratio_sum.to_string(),
                "vault and working ratios must sum to 1.0",
            )
            .with_suggestion(format!(
                "set working_ratio to {}",
                1.0 - self.vault.vault_ratio
            )));
        }

        if self.game.min_multiplier > self.game.max_multiplier {
            return Err(EngineError::config_invalid(
                "game.min_multiplier",
                self.game.min_multiplier.to_string(),
                "min_multiplier exceeds max_multiplier",
            )
            .with_suggestion(format!("set min_multiplier below {}", self.game.max_multiplier)));
        }

        if self.game.min_bet > self.game.max_bet {
            return Err(EngineError::config_invalid(
                "game.min_bet",
                self.game.min_bet.to_string(),
                "min_bet exceeds max_bet",
            )
            .with_suggestion(format!("set min_bet below {}", self.game.max_bet)));
        }

        Ok(())
    }
}
