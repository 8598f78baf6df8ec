use crate::plan::{PlanResult, SessionOutcome};

/// One plan's outcomes reduced to the numbers a comparison cares about.
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub plan_name: String,
    pub session_count: usize,
    pub mean_roi: f64,
    pub best_roi: f64,
    pub worst_roi: f64,
    pub fatal_error_count: usize,
}

/// Outcomes within a single plan, ranked best-first by return on the
/// session's own starting balance.
pub fn rank_by_roi(result: &PlanResult) -> Vec<&SessionOutcome> {
    let mut ranked: Vec<&SessionOutcome> = result.outcomes.iter().collect();
    ranked.sort_by(|a, b| b.roi().partial_cmp(&a.roi()).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

pub fn summarize(result: &PlanResult) -> PlanSummary {
    let rois: Vec<f64> = result.outcomes.iter().map(SessionOutcome::roi).collect();
    let session_count = rois.len();
    let mean_roi = if session_count == 0 {
        0.0
    } else {
        rois.iter().sum::<f64>() / session_count as f64
    };
    let best_roi = rois.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let worst_roi = rois.iter().copied().fold(f64::INFINITY, f64::min);

    PlanSummary {
        plan_name: result.plan_name.clone(),
        session_count,
        mean_roi: if session_count == 0 { 0.0 } else { mean_roi },
        best_roi: if session_count == 0 { 0.0 } else { best_roi },
        worst_roi: if session_count == 0 { 0.0 } else { worst_roi },
        fatal_error_count: result.fatal_errors().len(),
    }
}

/// Compare several plans (e.g. one per strategy preset), best mean ROI
/// first.
pub fn compare_plans(results: &[PlanResult]) -> Vec<PlanSummary> {
    let mut summaries: Vec<PlanSummary> = results.iter().map(summarize).collect();
    summaries.sort_by(|a, b| b.mean_roi.partial_cmp(&a.mean_roi).unwrap_or(std::cmp::Ordering::Equal));
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use diceforge_models::money::Money;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn outcome(label: &str, initial: i64, final_: i64, error: Option<&str>) -> SessionOutcome {
        SessionOutcome {
            session_id: Uuid::new_v4(),
            label: label.into(),
            stop_reason: "MaxBets".into(),
            initial_balance: Money::new(dec!(1) * rust_decimal::Decimal::from(initial)),
            final_balance: Money::new(dec!(1) * rust_decimal::Decimal::from(final_)),
            bets_count: 10,
            wins_count: 5,
            losses_count: 5,
            max_drawdown: 0.1,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn ranks_best_roi_first() {
        let result = PlanResult {
            plan_name: "p".into(),
            outcomes: vec![outcome("a", 100, 90, None), outcome("b", 100, 150, None)],
        };
        let ranked = rank_by_roi(&result);
        assert_eq!(ranked[0].label, "b");
    }

    #[test]
    fn summary_counts_fatal_errors() {
        let result = PlanResult {
            plan_name: "p".into(),
            outcomes: vec![outcome("a", 100, 90, None), outcome("b", 100, 0, Some("oracle exhausted"))],
        };
        let summary = summarize(&result);
        assert_eq!(summary.fatal_error_count, 1);
        assert_eq!(summary.session_count, 2);
    }

    #[test]
    fn compare_plans_orders_by_mean_roi() {
        let weak = PlanResult {
            plan_name: "weak".into(),
            outcomes: vec![outcome("a", 100, 50, None)],
        };
        let strong = PlanResult {
            plan_name: "strong".into(),
            outcomes: vec![outcome("a", 100, 200, None)],
        };
        let ranked = compare_plans(&[weak, strong]);
        assert_eq!(ranked[0].plan_name, "strong");
    }
}
