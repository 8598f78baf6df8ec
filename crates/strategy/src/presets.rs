use diceforge_models::bet::BetType;
use diceforge_models::money::Money;

use crate::adaptive::{AdaptiveCondition, AdaptiveRule, AdaptiveState};
use crate::composite::{CombineMode, CompositeState};
use crate::parking::{ParkingOptions, ParkingState};
use crate::progression::{DAlembertState, FibonacciState, FlatState, MartingaleState, ParoliState};
use crate::strategy::{Strategy, StrategyKind};

/// Flat betting, no parking wrapper: the lowest-variance preset.
pub fn conservative(base_bet: Money, multiplier: f64) -> Strategy {
    Strategy::new(StrategyKind::Flat(FlatState::new(base_bet, multiplier, BetType::Under)))
}

fn dalembert_inner(base_bet: Money, unit: Money, multiplier: f64) -> Strategy {
    Strategy::new(StrategyKind::DAlembert(DAlembertState::new(base_bet, unit, multiplier, BetType::Under)))
}

fn martingale_inner(base_bet: Money, max_doublings: u32, multiplier: f64) -> Strategy {
    Strategy::new(StrategyKind::Martingale(MartingaleState::new(
        base_bet,
        max_doublings,
        multiplier,
        BetType::Under,
    )))
}

fn adaptive_roster_inner(base_bet: Money, multiplier: f64) -> Strategy {
    let flat = Strategy::new(StrategyKind::Flat(FlatState::new(base_bet, multiplier, BetType::Under)));
    let paroli = Strategy::new(StrategyKind::Paroli(ParoliState::new(base_bet, multiplier, BetType::Under)));
    let fibonacci = Strategy::new(StrategyKind::Fibonacci(FibonacciState::new(
        base_bet,
        multiplier,
        BetType::Under,
    )));

    let rules = vec![
        AdaptiveRule {
            condition: AdaptiveCondition::ConsecutiveWins(3),
            target_index: 1,
        },
        AdaptiveRule {
            condition: AdaptiveCondition::DrawdownPct(0.15),
            target_index: 2,
        },
    ];
    Strategy::new(StrategyKind::Adaptive(AdaptiveState::new(vec![flat, paroli, fibonacci], rules, 5)))
}

fn with_parking(inner: Strategy, min_bet: Money, parking: ParkingOptions) -> Strategy {
    let parking = ParkingOptions {
        parking_bet_amount: parking.parking_bet_amount.max(min_bet),
        ..parking
    };
    Strategy::new(StrategyKind::Parking(ParkingState::with_options(inner, parking)))
}

/// D'Alembert wrapped in parking: gentle progression, with a fallback for
/// long losing runs.
pub fn moderate(base_bet: Money, unit: Money, multiplier: f64, min_bet: Money) -> Strategy {
    moderate_with_parking(base_bet, unit, multiplier, min_bet, ParkingOptions::default())
}

/// Same as [`moderate`], but with parking's thresholds supplied explicitly
/// (the binary wires these in from its `[parking]` config section).
pub fn moderate_with_parking(base_bet: Money, unit: Money, multiplier: f64, min_bet: Money, parking: ParkingOptions) -> Strategy {
    with_parking(dalembert_inner(base_bet, unit, multiplier), min_bet, parking)
}

/// D'Alembert with no parking wrapper, for callers whose `[parking]`
/// section has `enabled = false`.
pub fn moderate_plain(base_bet: Money, unit: Money, multiplier: f64) -> Strategy {
    dalembert_inner(base_bet, unit, multiplier)
}

/// Martingale wrapped in parking: highest single-session variance, capped
/// and cushioned by the parking cascade.
pub fn aggressive(base_bet: Money, max_doublings: u32, multiplier: f64, min_bet: Money) -> Strategy {
    aggressive_with_parking(base_bet, max_doublings, multiplier, min_bet, ParkingOptions::default())
}

/// Same as [`aggressive`], but with parking's thresholds supplied
/// explicitly.
pub fn aggressive_with_parking(
    base_bet: Money,
    max_doublings: u32,
    multiplier: f64,
    min_bet: Money,
    parking: ParkingOptions,
) -> Strategy {
    with_parking(martingale_inner(base_bet, max_doublings, multiplier), min_bet, parking)
}

/// Martingale with no parking wrapper.
pub fn aggressive_plain(base_bet: Money, max_doublings: u32, multiplier: f64) -> Strategy {
    martingale_inner(base_bet, max_doublings, multiplier)
}

/// An adaptive roster that starts flat, escalates to Paroli on a hot streak,
/// and falls back to Fibonacci under drawdown pressure — wrapped in parking
/// so the escalation never runs out of nonces to retreat with.
pub fn experimental(base_bet: Money, multiplier: f64, min_bet: Money) -> Strategy {
    experimental_with_parking(base_bet, multiplier, min_bet, ParkingOptions::default())
}

/// Same as [`experimental`], but with parking's thresholds supplied
/// explicitly.
pub fn experimental_with_parking(base_bet: Money, multiplier: f64, min_bet: Money, parking: ParkingOptions) -> Strategy {
    with_parking(adaptive_roster_inner(base_bet, multiplier), min_bet, parking)
}

/// The adaptive roster with no parking wrapper.
pub fn experimental_plain(base_bet: Money, multiplier: f64) -> Strategy {
    adaptive_roster_inner(base_bet, multiplier)
}

/// Two progressions blended by consensus, for callers who want a composite
/// preset without hand-assembling one.
pub fn balanced_composite(base_bet: Money, multiplier: f64) -> Strategy {
    let flat = Strategy::new(StrategyKind::Flat(FlatState::new(base_bet, multiplier, BetType::Under)));
    let dalembert = Strategy::new(StrategyKind::DAlembert(DAlembertState::new(
        base_bet,
        base_bet,
        multiplier,
        BetType::Under,
    )));
    Strategy::new(StrategyKind::Composite(CompositeState::new(
        vec![flat, dalembert],
        CombineMode::Average,
    )))
}
