use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

pub const DEFAULT_VAULT_RATIO: f64 = 0.85;
pub const DEFAULT_WORKING_RATIO: f64 = 0.15;
pub const DEFAULT_MAX_TRANSFERS_PER_DAY: u32 = 2;
const REPLENISH_THRESHOLD_RATIO: f64 = 0.5;
const SKIM_PROFIT_RATIO: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferTrigger {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub executed: bool,
    pub amount: Money,
}

impl TransferOutcome {
    fn none() -> Self {
        Self {
            executed: false,
            amount: Money::ZERO,
        }
    }
}

/// Splits a simulation's capital into a vault (held in reserve) and a
/// working balance (what a session actually plays with).
///
/// Invariant: `vault_balance + working_balance == initial_capital +
/// cumulative_pnl` at every quiescent point — transfers only move money
/// between the two fields, never create or destroy it; only
/// [`Vault::close_session`] injects a session's realised profit/loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    pub vault_balance: Money,
    pub working_balance: Money,
    pub vault_ratio: f64,
    pub working_ratio: f64,
    working_target: Money,
    max_transfers_per_day: u32,
    #[serde(skip)]
    transfer_log: VecDeque<DateTime<Utc>>,
}

impl Vault {
    pub fn new(
        initial_capital: Money,
        vault_ratio: f64,
        working_ratio: f64,
        max_transfers_per_day: u32,
    ) -> Self {
        let vault_balance = initial_capital.mul_rate(vault_ratio);
        let working_balance = initial_capital - vault_balance;
        Self {
            vault_balance,
            working_balance,
            vault_ratio,
            working_ratio,
            working_target: working_balance,
            max_transfers_per_day,
            transfer_log: VecDeque::new(),
        }
    }

    pub fn total_capital(&self) -> Money {
        self.vault_balance + self.working_balance
    }

    /// Hand the current working balance to a new session.
    pub fn create_session(&self) -> Money {
        self.working_balance
    }

    /// Fold a finished session's ending balance back into working capital.
    /// The delta (`final_working - working_balance`) is the session's
    /// realised profit or loss, the only operation allowed to change
    /// `total_capital()`.
    pub fn close_session(&mut self, final_working: Money) {
        self.working_balance = final_working;
    }

    fn prune_and_count(&mut self, now: DateTime<Utc>) -> u32 {
        let cutoff = now - Duration::hours(24);
        while matches!(self.transfer_log.front(), Some(ts) if *ts < cutoff) {
            self.transfer_log.pop_front();
        }
        self.transfer_log.len() as u32
    }

    fn rate_limited(&mut self, now: DateTime<Utc>, trigger: TransferTrigger) -> bool {
        trigger == TransferTrigger::Auto && self.prune_and_count(now) >= self.max_transfers_per_day
    }

    /// Replenish working from vault when it has dropped below half its
    /// starting size. Manual calls bypass the daily rate limit; auto calls
    /// beyond the limit become no-ops.
    pub fn replenish(&mut self, now: DateTime<Utc>, trigger: TransferTrigger) -> TransferOutcome {
        let threshold = self.working_target.mul_rate(REPLENISH_THRESHOLD_RATIO);
        if self.working_balance >= threshold {
            return TransferOutcome::none();
        }
        if self.rate_limited(now, trigger) {
            return TransferOutcome::none();
        }

        let shortfall = self.working_target - self.working_balance;
        let amount = shortfall.min(self.vault_balance);
        if amount.is_zero() || amount.is_negative() {
            return TransferOutcome::none();
        }

        self.vault_balance -= amount;
        self.working_balance += amount;
        if trigger == TransferTrigger::Auto {
            self.transfer_log.push_back(now);
        }
        TransferOutcome {
            executed: true,
            amount,
        }
    }

    /// Skim profit above the +10% mark back into the vault.
    pub fn skim(
        &mut self,
        now: DateTime<Utc>,
        session_profit: Money,
        trigger: TransferTrigger,
    ) -> TransferOutcome {
        let skim_threshold = self.working_target.mul_rate(SKIM_PROFIT_RATIO);
        if session_profit < skim_threshold {
            return TransferOutcome::none();
        }
        if self.rate_limited(now, trigger) {
            return TransferOutcome::none();
        }

        let amount = session_profit - skim_threshold;
        if amount.is_zero() || amount.is_negative() {
            return TransferOutcome::none();
        }
        let amount = amount.min(self.working_balance);

        self.working_balance -= amount;
        self.vault_balance += amount;
        if trigger == TransferTrigger::Auto {
            self.transfer_log.push_back(now);
        }
        TransferOutcome {
            executed: true,
            amount,
        }
    }
}
