//! Running many session close/replenish/skim cycles through a [`Vault`]
//! never drifts `total_capital()` away from `initial_capital +
//! cumulative_pnl`, checked with exact `Money` equality rather than a float
//! tolerance.

use diceforge_models::money::Money;
use diceforge_models::vault::{TransferTrigger, Vault};
use rust_decimal_macros::dec;

#[test]
fn vault_ratio_holds_exactly_across_many_sessions() {
    let initial_capital = Money::new(dec!(250));
    let mut vault = Vault::new(initial_capital, 0.85, 0.15, 2);
    let now = chrono::Utc::now();

    // alternating small wins and losses, deterministic and exact in Decimal
    let deltas = [
        dec!(0.40), dec!(-0.15), dec!(0.05), dec!(-0.30), dec!(0.90),
        dec!(-0.05), dec!(0.10), dec!(-0.50), dec!(0.25), dec!(-0.10),
    ];

    let mut cumulative_pnl = Money::ZERO;
    for delta in deltas {
        let delta = Money::new(delta);
        let final_working = vault.working_balance + delta;
        vault.close_session(final_working);
        cumulative_pnl += delta;

        vault.replenish(now, TransferTrigger::Auto);
        vault.skim(now, delta.max(Money::ZERO), TransferTrigger::Auto);

        assert_eq!(
            vault.total_capital(),
            initial_capital + cumulative_pnl,
            "ledger drifted after a close/replenish/skim cycle"
        );
    }
}

/// Ten thousand bet-sized deltas through close_session alone (no transfers
/// in between) must sum exactly, since close_session is the only operation
/// allowed to change total_capital().
#[test]
fn ledger_closes_exactly_over_many_bets() {
    let initial_capital = Money::new(dec!(1_000));
    let mut vault = Vault::new(initial_capital, 0.85, 0.15, 1_000_000);

    let mut cumulative_pnl = Money::ZERO;
    for i in 0..10_000i64 {
        let sign = if i % 3 == 0 { -1 } else { 1 };
        let delta = Money::new(decimal_from_cents(sign * ((i % 7) + 1)));
        let final_working = vault.working_balance + delta;
        vault.close_session(final_working);
        cumulative_pnl += delta;
    }

    assert_eq!(vault.total_capital(), initial_capital + cumulative_pnl);
}

fn decimal_from_cents(cents: i64) -> rust_decimal::Decimal {
    rust_decimal::Decimal::new(cents, 2)
}
