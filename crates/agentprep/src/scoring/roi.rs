use chrono::Utc;

use crate::model::{Metrics, RoiResults};

/// Working days assumed per year when annualising daily volume.
pub const WORKING_DAYS_PER_YEAR: f64 = 260.0;

const BASE_EFFICIENCY_GAIN: f64 = 0.6;
const COMPLETION_EFFICIENCY_BONUS: f64 = 0.2;
const MIN_IMPLEMENTATION_COST_USD: f64 = 5_000.0;
const IMPLEMENTATION_COST_SHARE: f64 = 0.2;
const MAX_PAYBACK_MONTHS: f64 = 60.0;
const MIN_CONFIDENCE: f64 = 0.2;

/// Projects current vs. automated annual cost.
///
/// Returns `None` unless volume, handling time, and hourly cost are all
/// positive. `completion_ratio` (0..=1) raises the assumed efficiency gain
/// from 60% to 80% and doubles as the confidence score.
pub fn compute_roi(metrics: &Metrics, completion_ratio: f64) -> Option<RoiResults> {
    if !metrics.is_sufficient() {
        return None;
    }
    let completion = completion_ratio.clamp(0.0, 1.0);

    let annual_hours =
        metrics.baseline_volume * metrics.avg_handling_time_minutes * WORKING_DAYS_PER_YEAR / 60.0;
    let mut current_annual_cost = annual_hours * metrics.fte_cost_per_hour;
    current_annual_cost += current_annual_cost * metrics.error_rate;
    current_annual_cost += metrics.breach_cost_usd;

    let efficiency_gain = BASE_EFFICIENCY_GAIN + completion * COMPLETION_EFFICIENCY_BONUS;
    let future_annual_cost = current_annual_cost * (1.0 - efficiency_gain);
    let annual_savings = (current_annual_cost - future_annual_cost).max(0.0);

    let implementation_cost =
        MIN_IMPLEMENTATION_COST_USD.max(current_annual_cost * IMPLEMENTATION_COST_SHARE);
    let payback_months = if annual_savings > 0.0 {
        (implementation_cost / annual_savings * 12.0).min(MAX_PAYBACK_MONTHS)
    } else {
        MAX_PAYBACK_MONTHS
    };
    let three_year_value = (annual_savings * 3.0 - implementation_cost).max(0.0);

    Some(RoiResults {
        use_case_id: metrics.use_case_id.clone(),
        current_annual_cost_usd: current_annual_cost,
        future_annual_cost_usd: future_annual_cost,
        annual_savings_usd: annual_savings,
        payback_months,
        three_year_value_usd: three_year_value,
        confidence_score: completion.clamp(MIN_CONFIDENCE, 1.0),
        calculated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 0.005,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_reference_scenario_to_the_cent() {
        let metrics = Metrics::new(500.0, 15.0, 45.0, 0.05, 250.0);
        let roi = compute_roi(&metrics, 1.0).unwrap();

        // 500 * 15 * 260 / 60 = 32,500 hours at $45, plus 5% rework, plus $250.
        close(roi.current_annual_cost_usd, 1_535_875.00);
        close(roi.future_annual_cost_usd, 307_175.00);
        close(roi.annual_savings_usd, 1_228_700.00);
        close(roi.payback_months, 3.0);
        close(roi.three_year_value_usd, 3_378_925.00);
        assert_eq!(roi.confidence_score, 1.0);
    }

    #[test]
    fn test_insufficient_inputs_yield_none() {
        assert!(compute_roi(&Metrics::new(0.0, 15.0, 45.0, 0.0, 0.0), 1.0).is_none());
        assert!(compute_roi(&Metrics::new(500.0, 0.0, 45.0, 0.0, 0.0), 1.0).is_none());
        assert!(compute_roi(&Metrics::new(500.0, 15.0, 0.0, 0.0, 0.0), 1.0).is_none());
        assert!(compute_roi(&Metrics::default(), 0.5).is_none());
    }

    #[test]
    fn test_low_completion_uses_sixty_percent_gain() {
        let metrics = Metrics::new(10.0, 6.0, 50.0, 0.0, 0.0);
        let roi = compute_roi(&metrics, 0.0).unwrap();
        // 10 * 6 * 260 / 60 = 260 hours * $50 = $13,000.
        close(roi.current_annual_cost_usd, 13_000.0);
        close(roi.future_annual_cost_usd, 5_200.0);
        close(roi.annual_savings_usd, 7_800.0);
        // Implementation floor of $5,000 dominates 20% of $13,000.
        close(roi.payback_months, 5_000.0 / 7_800.0 * 12.0);
        close(roi.three_year_value_usd, 7_800.0 * 3.0 - 5_000.0);
        assert_eq!(roi.confidence_score, 0.2);
    }

    #[test]
    fn test_payback_capped_at_sixty_months() {
        // $1/hour for one minute a day: savings far below the $5,000 floor.
        let metrics = Metrics::new(1.0, 1.0, 1.0, 0.0, 0.0);
        let roi = compute_roi(&metrics, 0.0).unwrap();
        assert_eq!(roi.payback_months, 60.0);
        assert_eq!(roi.three_year_value_usd, 0.0);
    }

    #[test]
    fn test_bounds_hold_across_inputs() {
        let volumes = [1.0, 37.0, 500.0, 25_000.0];
        let minutes = [0.5, 15.0, 240.0];
        let costs = [1.0, 45.0, 300.0];
        let errors = [0.0, 0.05, 1.0];
        let ratios = [0.0, 0.3, 1.0];

        for &v in &volumes {
            for &m in &minutes {
                for &c in &costs {
                    for &e in &errors {
                        for &r in &ratios {
                            let roi = compute_roi(&Metrics::new(v, m, c, e, 100.0), r).unwrap();
                            assert!(roi.future_annual_cost_usd <= roi.current_annual_cost_usd);
                            assert!(roi.annual_savings_usd >= 0.0);
                            assert!((0.0..=60.0).contains(&roi.payback_months));
                            assert!(roi.three_year_value_usd >= 0.0);
                            assert!((0.2..=1.0).contains(&roi.confidence_score));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_carries_use_case_id() {
        let mut metrics = Metrics::new(10.0, 10.0, 10.0, 0.0, 0.0);
        metrics.use_case_id = "uc-9".into();
        assert_eq!(compute_roi(&metrics, 0.5).unwrap().use_case_id, "uc-9");
    }
}
