use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bet::BetType;
use crate::decision::BetDecision;
use crate::money::Money;
use crate::session::StopReason;
use crate::vault::TransferTrigger;

/// One entry on the in-process event bus.
///
/// `session_id` is `None` for runner-level events (e.g. `CheckpointWritten`)
/// that are not scoped to a single session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub session_id: Option<Uuid>,
    pub kind: EventKind,
}

impl Event {
    pub fn new(session_id: Option<Uuid>, kind: EventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            session_id,
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    BetPlaced {
        amount: Money,
        multiplier: f64,
        bet_type: BetType,
        nonce: u64,
    },
    BetResolved {
        won: bool,
        payout: Money,
        nonce: u64,
    },
    BetDecision {
        decision: BetDecision,
    },
    BetResult {
        won: bool,
        balance_after: Money,
    },
    WinningStreak {
        length: u64,
    },
    LosingStreak {
        length: u64,
    },
    DrawdownAlert {
        drawdown: f64,
    },
    ProfitTargetReached {
        roi: f64,
    },
    StopLossTriggered {
        roi: f64,
    },
    SessionStart {
        start_balance: Money,
    },
    SessionEnd {
        reason: StopReason,
        final_balance: Money,
        bets_count: u64,
    },
    StrategyToggle,
    StrategySeedChange,
    StrategyParkingBet,
    StrategySwitch {
        from: String,
        to: String,
    },
    CheckpointWritten {
        path: String,
        completed_sessions: usize,
    },
    VaultTransfer {
        trigger: TransferTrigger,
        amount: Money,
        to_vault: bool,
    },
}
