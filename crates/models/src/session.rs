use serde::{Deserialize, Serialize};

use crate::game_state::GameState;
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Bankrupt,
    StopLoss,
    TakeProfit,
    MaxBets,
    ExternalCancel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub stop_loss_ratio: f64,
    pub take_profit_ratio: f64,
    pub max_bets: u64,
    pub min_bet: Money,
}

/// Wraps [`GameState`] with the session's stop-condition policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub config: SessionConfig,
    pub game_state: GameState,
    pub cancelled: bool,
}

impl SessionState {
    pub fn new(config: SessionConfig, start_balance: Money, history_window: usize) -> Self {
        Self {
            config,
            game_state: GameState::new(start_balance, history_window),
            cancelled: false,
        }
    }

    pub fn request_cancel(&mut self) {
        self.cancelled = true;
    }

    /// First stop condition that holds, checked in the order listed in spec
    /// §4.5: bankrupt, stop-loss, take-profit, max-bets, then external
    /// cancellation.
    pub fn should_stop(&self) -> Option<StopReason> {
        let gs = &self.game_state;

        if gs.balance < self.config.min_bet {
            return Some(StopReason::Bankrupt);
        }

        let start = gs.session_start_balance.to_f64_lossy();
        if start != 0.0 {
            let pnl_ratio = (gs.balance.to_f64_lossy() - start) / start;
            if pnl_ratio <= self.config.stop_loss_ratio {
                return Some(StopReason::StopLoss);
            }
            if pnl_ratio >= self.config.take_profit_ratio {
                return Some(StopReason::TakeProfit);
            }
        }

        if gs.bets_count >= self.config.max_bets {
            return Some(StopReason::MaxBets);
        }

        if self.cancelled {
            return Some(StopReason::ExternalCancel);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::{BetResult, BetType};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn config() -> SessionConfig {
        SessionConfig {
            stop_loss_ratio: -0.5,
            take_profit_ratio: 0.5,
            max_bets: 1000,
            min_bet: Money::new(dec!(0.00015)),
        }
    }

    #[test]
    fn bankrupt_takes_priority() {
        let mut session = SessionState::new(config(), Money::new(dec!(0.0001)), 20);
        session.game_state.balance = Money::new(dec!(0.00001));
        assert_eq!(session.should_stop(), Some(StopReason::Bankrupt));
    }

    #[test]
    fn stop_loss_fires_at_ratio() {
        let mut session = SessionState::new(config(), Money::new(dec!(100)), 20);
        session.game_state.balance = Money::new(dec!(49));
        assert_eq!(session.should_stop(), Some(StopReason::StopLoss));
    }

    #[test]
    fn take_profit_fires_at_ratio() {
        let mut session = SessionState::new(config(), Money::new(dec!(100)), 20);
        session.game_state.balance = Money::new(dec!(151));
        assert_eq!(session.should_stop(), Some(StopReason::TakeProfit));
    }

    #[test]
    fn max_bets_fires_after_cap() {
        let mut session = SessionState::new(config(), Money::new(dec!(100)), 20);
        let win = BetResult {
            roll: dec!(1.0),
            threshold: 49.5,
            won: true,
            bet: Money::new(dec!(0.01)),
            multiplier: 2.0,
            payout: Money::new(dec!(0.02)),
            bet_type: BetType::Under,
            server_seed_hash: "h".into(),
            client_seed: "c".into(),
            nonce: 0,
            timestamp: Utc::now(),
        };
        for _ in 0..1000 {
            session.game_state.record_bet(&win, false);
        }
        assert_eq!(session.should_stop(), Some(StopReason::MaxBets));
    }

    #[test]
    fn external_cancel_is_last_resort() {
        let mut session = SessionState::new(config(), Money::new(dec!(100)), 20);
        session.request_cancel();
        assert_eq!(session.should_stop(), Some(StopReason::ExternalCancel));
    }

    #[test]
    fn healthy_session_does_not_stop() {
        let session = SessionState::new(config(), Money::new(dec!(100)), 20);
        assert_eq!(session.should_stop(), None);
    }
}
