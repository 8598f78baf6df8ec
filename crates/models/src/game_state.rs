use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bet::BetResult;
use crate::money::Money;

pub const DEFAULT_HISTORY_WINDOW: usize = 20;
pub const MAX_HISTORY_WINDOW: usize = 100;

/// Rolling per-session ledger and streak/drawdown tracker.
///
/// `current_streak` is signed: positive is a run of `n` wins, negative a run
/// of `n` losses, `0` only before the first bet. `bet_history` is a bounded
/// ring of the most recent results (default window 20, configurable up to
/// 100) used by strategies that need recent context beyond the aggregate
/// counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub balance: Money,
    pub bets_count: u64,
    pub wins_count: u64,
    pub losses_count: u64,
    pub current_streak: i64,
    pub max_consecutive_wins: u64,
    pub max_consecutive_losses: u64,
    pub peak_balance: Money,
    pub trough_balance: Money,
    pub current_drawdown: f64,
    pub max_drawdown: f64,
    pub bet_history: VecDeque<BetResult>,
    history_window: usize,
    pub parking_bets_count: u64,
    pub parking_losses: u64,
    pub seed_rotations_count: u64,
    pub bet_type_toggles: u64,
    pub session_start_time: DateTime<Utc>,
    pub session_start_balance: Money,
}

impl GameState {
    pub fn new(start_balance: Money, history_window: usize) -> Self {
        let history_window = history_window.clamp(1, MAX_HISTORY_WINDOW);
        Self {
            balance: start_balance,
            bets_count: 0,
            wins_count: 0,
            losses_count: 0,
            current_streak: 0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            peak_balance: start_balance,
            trough_balance: start_balance,
            current_drawdown: 0.0,
            max_drawdown: 0.0,
            bet_history: VecDeque::with_capacity(history_window),
            history_window,
            parking_bets_count: 0,
            parking_losses: 0,
            seed_rotations_count: 0,
            bet_type_toggles: 0,
            session_start_time: Utc::now(),
            session_start_balance: start_balance,
        }
    }

    /// Apply a resolved bet to the running ledger. `parking` marks whether
    /// this result came from a parking bet, which is counted separately but
    /// still updates balance, streaks and drawdown like any other bet.
    pub fn record_bet(&mut self, result: &BetResult, parking: bool) {
        self.balance += result.profit();
        self.bets_count += 1;

        if result.won {
            self.wins_count += 1;
            self.current_streak = if self.current_streak > 0 {
                self.current_streak + 1
            } else {
                1
            };
            self.max_consecutive_wins = self.max_consecutive_wins.max(self.current_streak as u64);
        } else {
            self.losses_count += 1;
            self.current_streak = if self.current_streak < 0 {
                self.current_streak - 1
            } else {
                -1
            };
            if parking {
                self.parking_losses += 1;
            }
            self.max_consecutive_losses = self
                .max_consecutive_losses
                .max(self.current_streak.unsigned_abs());
        }

        if parking {
            self.parking_bets_count += 1;
        }

        self.peak_balance = self.peak_balance.max(self.balance);
        self.trough_balance = self.trough_balance.min(self.balance);

        self.current_drawdown = self.drawdown_ratio(self.balance);
        self.max_drawdown = self.max_drawdown.max(self.current_drawdown);

        if self.bet_history.len() == self.history_window {
            self.bet_history.pop_front();
        }
        self.bet_history.push_back(result.clone());
    }

    pub fn record_toggle(&mut self) {
        self.bet_type_toggles += 1;
    }

    pub fn record_rotation(&mut self) {
        self.seed_rotations_count += 1;
    }

    fn drawdown_ratio(&self, balance: Money) -> f64 {
        if self.peak_balance.is_zero() {
            return 0.0;
        }
        let peak = self.peak_balance.to_f64_lossy();
        let current = balance.to_f64_lossy();
        if peak <= 0.0 {
            return 0.0;
        }
        ((peak - current) / peak).max(0.0)
    }

    pub fn consecutive_losses(&self) -> u64 {
        if self.current_streak < 0 {
            self.current_streak.unsigned_abs()
        } else {
            0
        }
    }

    pub fn consecutive_wins(&self) -> u64 {
        if self.current_streak > 0 {
            self.current_streak as u64
        } else {
            0
        }
    }

    pub fn roi(&self) -> f64 {
        let start = self.session_start_balance.to_f64_lossy();
        if start == 0.0 {
            return 0.0;
        }
        (self.balance.to_f64_lossy() - start) / start
    }

    pub fn win_rate(&self) -> f64 {
        if self.bets_count == 0 {
            0.0
        } else {
            self.wins_count as f64 / self.bets_count as f64
        }
    }

    /// Sharpe-style ratio over the bounded history window: mean return over
    /// stddev of returns, per bet.
    pub fn sharpe_ratio(&self) -> f64 {
        let returns: Vec<f64> = self
            .bet_history
            .iter()
            .map(|r| r.profit().to_f64_lossy())
            .collect();
        if returns.is_empty() {
            return 0.0;
        }
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        let stddev = variance.sqrt();
        if stddev.abs() < f64::EPSILON {
            0.0
        } else {
            mean / stddev
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bet::BetType;
    use rust_decimal_macros::dec;

    fn result(won: bool, bet: rust_decimal::Decimal, multiplier: f64) -> BetResult {
        let bet_money = Money::new(bet);
        BetResult {
            roll: dec!(10.00),
            threshold: 49.5,
            won,
            bet: bet_money,
            multiplier,
            payout: if won {
                bet_money.mul_rate(multiplier)
            } else {
                Money::ZERO
            },
            bet_type: BetType::Under,
            server_seed_hash: "h".into(),
            client_seed: "c".into(),
            nonce: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn streak_flips_sign_on_outcome_change() {
        let mut state = GameState::new(Money::new(dec!(100)), DEFAULT_HISTORY_WINDOW);
        state.record_bet(&result(true, dec!(1), 2.0), false);
        state.record_bet(&result(true, dec!(1), 2.0), false);
        assert_eq!(state.current_streak, 2);
        state.record_bet(&result(false, dec!(1), 2.0), false);
        assert_eq!(state.current_streak, -1);
        assert_eq!(state.max_consecutive_wins, 2);
    }

    #[test]
    fn drawdown_tracks_distance_from_peak() {
        let mut state = GameState::new(Money::new(dec!(100)), DEFAULT_HISTORY_WINDOW);
        state.record_bet(&result(false, dec!(10), 2.0), false);
        assert!(state.current_drawdown > 0.0);
        assert_eq!(state.max_drawdown, state.current_drawdown);
    }

    #[test]
    fn history_window_is_bounded() {
        let mut state = GameState::new(Money::new(dec!(1000)), 3);
        for _ in 0..10 {
            state.record_bet(&result(true, dec!(1), 2.0), false);
        }
        assert_eq!(state.bet_history.len(), 3);
    }

    #[test]
    fn parking_bet_losses_tracked_separately_from_total_losses() {
        let mut state = GameState::new(Money::new(dec!(100)), DEFAULT_HISTORY_WINDOW);
        state.record_bet(&result(false, dec!(1), 2.0), true);
        assert_eq!(state.parking_losses, 1);
        assert_eq!(state.losses_count, 1);
        assert_eq!(state.parking_bets_count, 1);
    }
}
