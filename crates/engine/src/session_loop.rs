use diceforge_models::bet::BetType;
use diceforge_models::decision::AltAction;
use diceforge_models::error::EngineError;
use diceforge_models::events::{Event, EventKind};
use diceforge_models::money::Money;
use diceforge_models::session::{SessionState, StopReason};
use diceforge_strategy::context::DecisionContext;
use diceforge_strategy::strategy::Strategy;
use uuid::Uuid;

use crate::event_bus::EventBus;
use crate::game::Game;

const MAX_CONSECUTIVE_SKIPS: u32 = 64;
const WINNING_STREAK_EVENT_THRESHOLD: u64 = 5;
const LOSING_STREAK_EVENT_THRESHOLD: u64 = 5;
const DRAWDOWN_ALERT_THRESHOLD: f64 = 0.20;

pub struct SessionSummary {
    pub session_id: Uuid,
    pub stop_reason: StopReason,
    pub final_balance: Money,
    pub bets_count: u64,
    pub wins_count: u64,
    pub losses_count: u64,
    pub max_drawdown: f64,
    pub error: Option<EngineError>,
}

/// Drives one session from its current state to a stop condition.
///
/// Mirrors the decision cycle: ask the strategy, apply any non-bet action
/// it requested, clamp and resolve a real bet otherwise, feed the result
/// back to both the session ledger and the strategy, then check again.
/// Non-bet actions never consume a nonce and loop immediately; a bounded
/// `MAX_CONSECUTIVE_SKIPS` guards against a misbehaving strategy looping
/// forever without ever placing a bet.
pub fn run_session(
    session_id: Uuid,
    session: &mut SessionState,
    game: &mut Game,
    strategy: &mut Strategy,
    base_bet: Money,
    base_multiplier: f64,
    default_bet_type: BetType,
    bus: &mut EventBus,
    is_cancelled: &dyn Fn() -> bool,
) -> SessionSummary {
    bus.publish(Event::new(
        Some(session_id),
        EventKind::SessionStart {
            start_balance: session.game_state.balance,
        },
    ));

    let mut error = None;
    let mut consecutive_skips = 0u32;

    let stop_reason = loop {
        if let Some(reason) = session.should_stop() {
            break reason;
        }
        if is_cancelled() {
            session.request_cancel();
            break StopReason::ExternalCancel;
        }

        let ctx = DecisionContext {
            game_state: &session.game_state,
            base_bet,
            base_multiplier,
            min_bet: session.config.min_bet,
            max_bet: session.game_state.balance,
            default_bet_type,
        };
        let decision = strategy.decide(&ctx);
        bus.publish(Event::new(
            Some(session_id),
            EventKind::BetDecision {
                decision: decision.clone(),
            },
        ));

        if decision.skip {
            consecutive_skips += 1;
            if consecutive_skips > MAX_CONSECUTIVE_SKIPS {
                error = Some(EngineError::StateCorrupt {
                    reason: "strategy exceeded maximum consecutive non-bet actions".into(),
                });
                break StopReason::ExternalCancel;
            }
            match decision.action {
                Some(AltAction::ToggleBetType) => {
                    session.game_state.record_toggle();
                    bus.publish(Event::new(Some(session_id), EventKind::StrategyToggle));
                }
                Some(AltAction::RotateSeed) => {
                    game.oracle_mut().rotate_seeds();
                    session.game_state.record_rotation();
                    bus.publish(Event::new(Some(session_id), EventKind::StrategySeedChange));
                }
                Some(AltAction::ParkingBet) | None => {}
            }
            continue;
        }
        consecutive_skips = 0;

        let amount = decision.amount.clamp(session.config.min_bet, session.game_state.balance);
        let result = match game.roll(amount, decision.multiplier, decision.bet_type) {
            Ok(result) => result,
            Err(EngineError::OracleExhausted { nonce }) => {
                error = Some(EngineError::OracleExhausted { nonce });
                break StopReason::ExternalCancel;
            }
            Err(e) => {
                error = Some(e);
                break StopReason::ExternalCancel;
            }
        };

        let is_parking_bet = decision.action == Some(AltAction::ParkingBet);
        session.game_state.record_bet(&result, is_parking_bet);
        strategy.update(&decision, &result);

        bus.publish(Event::new(
            Some(session_id),
            EventKind::BetResolved {
                won: result.won,
                payout: result.payout,
                nonce: result.nonce,
            },
        ));
        bus.publish(Event::new(
            Some(session_id),
            EventKind::BetResult {
                won: result.won,
                balance_after: session.game_state.balance,
            },
        ));
        if is_parking_bet {
            bus.publish(Event::new(Some(session_id), EventKind::StrategyParkingBet));
        }

        let wins = session.game_state.consecutive_wins();
        let losses = session.game_state.consecutive_losses();
        if wins > 0 && wins % WINNING_STREAK_EVENT_THRESHOLD == 0 {
            bus.publish(Event::new(Some(session_id), EventKind::WinningStreak { length: wins }));
        }
        if losses > 0 && losses % LOSING_STREAK_EVENT_THRESHOLD == 0 {
            bus.publish(Event::new(Some(session_id), EventKind::LosingStreak { length: losses }));
        }
        if session.game_state.current_drawdown >= DRAWDOWN_ALERT_THRESHOLD {
            bus.publish(Event::new(
                Some(session_id),
                EventKind::DrawdownAlert {
                    drawdown: session.game_state.current_drawdown,
                },
            ));
        }
    };

    match stop_reason {
        StopReason::TakeProfit => bus.publish(Event::new(
            Some(session_id),
            EventKind::ProfitTargetReached {
                roi: session.game_state.roi(),
            },
        )),
        StopReason::StopLoss => bus.publish(Event::new(
            Some(session_id),
            EventKind::StopLossTriggered {
                roi: session.game_state.roi(),
            },
        )),
        _ => {}
    }

    bus.publish(Event::new(
        Some(session_id),
        EventKind::SessionEnd {
            reason: stop_reason,
            final_balance: session.game_state.balance,
            bets_count: session.game_state.bets_count,
        },
    ));

    SessionSummary {
        session_id,
        stop_reason,
        final_balance: session.game_state.balance,
        bets_count: session.game_state.bets_count,
        wins_count: session.game_state.wins_count,
        losses_count: session.game_state.losses_count,
        max_drawdown: session.game_state.max_drawdown,
        error,
    }
}
