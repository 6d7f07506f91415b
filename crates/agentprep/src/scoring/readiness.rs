use chrono::Utc;

use super::{completion_ratio, round1, CatalogSnapshot};
use crate::model::Readiness;

const MAX_SCORE: f64 = 5.0;
const FALLBACK_SCORE: f64 = 2.0;

/// Scores how prepared a use case is for automation.
///
/// Always defined: an empty catalog still yields low baseline subscores.
pub fn compute_readiness(snapshot: &CatalogSnapshot) -> Readiness {
    let ratio = completion_ratio(snapshot);
    let roles = snapshot.role_count as f64;
    let steps = snapshot.step_count as f64;
    let connectors = snapshot.connector_count as f64;
    let rules = snapshot.rule_count as f64;
    let slas = snapshot.sla_count as f64;

    let api_maturity = cap(2.0 + (connectors * 0.7).min(3.0));

    let data_quality = if snapshot.data_asset_count > 0 {
        let richness = ((roles + steps) / 10.0).min(1.0);
        cap(3.5 + richness)
    } else {
        FALLBACK_SCORE
    };

    let rule_clarity = if snapshot.rule_count > 0 {
        cap(3.5 + (rules * 0.3).min(1.5))
    } else {
        FALLBACK_SCORE
    };

    // Falls as rules and SLAs accumulate; floor of 1.
    let exception_rate = cap((MAX_SCORE - (rules + slas) * 0.4).max(1.0));

    let has_volume = snapshot
        .metrics
        .as_ref()
        .is_some_and(|m| m.baseline_volume > 0.0);
    let volume_stability = if has_volume {
        cap(3.5 + (ratio * 2.0).min(1.5))
    } else {
        FALLBACK_SCORE
    };

    let security_posture = if snapshot.application_count > 0 {
        cap(3.5 + (connectors * 0.5).min(1.5))
    } else {
        2.5
    };

    Readiness {
        use_case_id: snapshot.use_case_id.clone(),
        overall_score: round1((ratio * MAX_SCORE).clamp(0.0, MAX_SCORE)),
        automation_fit_score: (40.0 + ratio * 60.0).round() as u32,
        api_maturity: round1(api_maturity),
        data_quality: round1(data_quality),
        rule_clarity: round1(rule_clarity),
        exception_rate: round1(exception_rate),
        volume_stability: round1(volume_stability),
        security_posture: round1(security_posture),
        calculated_at: Utc::now(),
    }
}

fn cap(score: f64) -> f64 {
    score.min(MAX_SCORE)
}
