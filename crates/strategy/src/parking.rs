use diceforge_models::bet::{BetResult, BetType};
use diceforge_models::decision::{AltAction, BetDecision, Genome};
use diceforge_models::money::Money;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::DecisionContext;
use crate::strategy::Strategy;

pub const DEFAULT_CONSECUTIVE_LOSSES_TRIGGER: u64 = 5;
pub const DEFAULT_DRAWDOWN_TRIGGER: f64 = 0.10;
pub const DEFAULT_MAX_TOGGLES_BEFORE_BET: u32 = 3;
pub const DEFAULT_AUTO_ROTATION_THRESHOLD: u32 = 1000;
pub const DEFAULT_PARKING_TARGET: f64 = 98.0;

/// The tunables a [`ParkingState`] needs beyond the strategy it wraps,
/// gathered so callers (presets, the binary's config loader) can build one
/// without a long positional argument list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParkingOptions {
    pub consecutive_losses_trigger: u64,
    pub drawdown_trigger: f64,
    pub max_toggles_before_bet: u32,
    pub auto_rotation_threshold: u32,
    pub parking_bet_amount: Money,
    pub parking_target: f64,
    pub parking_bet_type: BetType,
}

impl Default for ParkingOptions {
    fn default() -> Self {
        Self {
            consecutive_losses_trigger: DEFAULT_CONSECUTIVE_LOSSES_TRIGGER,
            drawdown_trigger: DEFAULT_DRAWDOWN_TRIGGER,
            max_toggles_before_bet: DEFAULT_MAX_TOGGLES_BEFORE_BET,
            auto_rotation_threshold: DEFAULT_AUTO_ROTATION_THRESHOLD,
            parking_bet_amount: Money::new(dec!(0.00015)),
            parking_target: DEFAULT_PARKING_TARGET,
            parking_bet_type: BetType::Under,
        }
    }
}

/// Wraps any strategy and handles the oracle's sequential-nonce constraint:
/// a session can't "wait out" a bad run without consuming nonces, so instead
/// it cascades through toggling bet direction, rotating seeds, and finally
/// placing minimal parking bets until the inner strategy is willing to bet
/// again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingState {
    pub inner: Box<Strategy>,
    pub options: ParkingOptions,
    toggled: bool,
    toggle_count: u32,
    bets_since_seed_rotation: u32,
}

impl ParkingState {
    /// Convenience constructor for callers happy with the spec-default
    /// thresholds; `min_bet` is unused beyond what `options` already
    /// specifies and is kept only so existing call sites compile unchanged.
    pub fn new(inner: Strategy, min_bet: Money) -> Self {
        let mut options = ParkingOptions::default();
        options.parking_bet_amount = options.parking_bet_amount.max(min_bet);
        Self::with_options(inner, options)
    }

    pub fn with_options(inner: Strategy, options: ParkingOptions) -> Self {
        Self {
            inner: Box::new(inner),
            options,
            toggled: false,
            toggle_count: 0,
            bets_since_seed_rotation: 0,
        }
    }

    fn effective_bet_type(&self, ctx: &DecisionContext<'_>) -> BetType {
        if self.toggled {
            ctx.default_bet_type.flipped()
        } else {
            ctx.default_bet_type
        }
    }

    fn spontaneously_triggered(&self, ctx: &DecisionContext<'_>) -> bool {
        ctx.game_state.consecutive_losses() >= self.options.consecutive_losses_trigger
            || ctx.game_state.current_drawdown >= self.options.drawdown_trigger
    }

    /// Asks the inner strategy first; parking only takes over when the
    /// inner strategy would rather not bet, or a spontaneous condition
    /// (deep drawdown, a long losing run) overrides it regardless of what
    /// the inner strategy decided.
    pub fn decide(&mut self, ctx: &DecisionContext<'_>) -> BetDecision {
        let mut inner_decision = self.inner.decide(ctx);
        if self.toggled {
            inner_decision.bet_type = inner_decision.bet_type.flipped();
        }

        if !inner_decision.skip && !self.spontaneously_triggered(ctx) {
            self.toggle_count = 0;
            return inner_decision;
        }

        if self.toggle_count < self.options.max_toggles_before_bet {
            self.toggle_count += 1;
            self.toggled = !self.toggled;
            return BetDecision::skip_with(AltAction::ToggleBetType, self.effective_bet_type(ctx), 0.1);
        }

        if self.bets_since_seed_rotation >= self.options.auto_rotation_threshold {
            self.toggle_count = 0;
            return BetDecision::skip_with(AltAction::RotateSeed, self.effective_bet_type(ctx), 0.1);
        }

        self.toggle_count = 0;
        let mut decision = BetDecision::bet(
            self.options.parking_bet_amount,
            100.0 / self.options.parking_target,
            self.options.parking_bet_type,
            0.05,
        );
        decision.action = Some(AltAction::ParkingBet);
        decision
    }

    pub fn update(&mut self, result: &BetResult) {
        self.bets_since_seed_rotation += 1;
        self.inner.kind.update(result);
    }

    pub fn on_alt_action(&mut self, action: AltAction) {
        if action == AltAction::RotateSeed {
            self.bets_since_seed_rotation = 0;
        }
        self.inner.on_alt_action(action);
    }

    pub fn reset(&mut self) {
        self.toggled = false;
        self.toggle_count = 0;
        self.bets_since_seed_rotation = 0;
        self.inner.reset();
    }

    pub fn genome(&self) -> Genome {
        let mut genome = self.inner.genome();
        genome.insert(
            "consecutive_losses_trigger".to_string(),
            json!(self.options.consecutive_losses_trigger),
        );
        genome.insert("drawdown_trigger".to_string(), json!(self.options.drawdown_trigger));
        genome.insert("max_toggles_before_bet".to_string(), json!(self.options.max_toggles_before_bet));
        genome.insert("auto_rotation_threshold".to_string(), json!(self.options.auto_rotation_threshold));
        genome.insert("parking_bet_amount".to_string(), json!(self.options.parking_bet_amount.to_string()));
        genome.insert("parking_target".to_string(), json!(self.options.parking_target));
        genome.insert("wrapped".to_string(), json!(true));
        genome
    }
}
