use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Operational baseline for a use case. One per use case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub use_case_id: String,
    /// Items handled per working day.
    #[serde(default)]
    pub baseline_volume: f64,
    #[serde(default)]
    pub avg_handling_time_minutes: f64,
    #[serde(default)]
    pub fte_cost_per_hour: f64,
    /// Share of items needing rework, 0..=1.
    #[serde(default)]
    pub error_rate: f64,
    /// Fixed yearly cost of SLA breaches.
    #[serde(default)]
    pub breach_cost_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Metrics {
    pub fn new(
        baseline_volume: f64,
        avg_handling_time_minutes: f64,
        fte_cost_per_hour: f64,
        error_rate: f64,
        breach_cost_usd: f64,
    ) -> Self {
        Self {
            use_case_id: String::new(),
            baseline_volume,
            avg_handling_time_minutes,
            fte_cost_per_hour,
            error_rate,
            breach_cost_usd,
            updated_at: None,
        }
    }

    /// Volume, handling time, and cost are all positive.
    pub fn is_sufficient(&self) -> bool {
        self.baseline_volume > 0.0 && self.avg_handling_time_minutes > 0.0 && self.fte_cost_per_hour > 0.0
    }
}

/// ROI projection. Always derived, never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResults {
    pub use_case_id: String,
    pub current_annual_cost_usd: f64,
    pub future_annual_cost_usd: f64,
    pub annual_savings_usd: f64,
    pub payback_months: f64,
    pub three_year_value_usd: f64,
    pub confidence_score: f64,
    pub calculated_at: DateTime<Utc>,
}

/// Automation readiness. Subscores are 0..=5, `automation_fit_score` 0..=100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    pub use_case_id: String,
    pub overall_score: f64,
    pub automation_fit_score: u32,
    pub api_maturity: f64,
    pub data_quality: f64,
    pub rule_clarity: f64,
    pub exception_rate: f64,
    pub volume_stability: f64,
    pub security_posture: f64,
    pub calculated_at: DateTime<Utc>,
}
