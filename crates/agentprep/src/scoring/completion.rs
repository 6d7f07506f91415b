use super::CatalogSnapshot;

/// Number of equally weighted checklist items.
pub const CHECKLIST_DIMENSIONS: usize = 7;

const MIN_STEPS: usize = 3;

/// Fraction of the checklist that is satisfied, in `0.0..=1.0`.
///
/// Items: overview filled in, a role, three steps, a data asset, an
/// application, a rule or SLA, and a positive baseline volume.
pub fn completion_ratio(snapshot: &CatalogSnapshot) -> f64 {
    let checks = [
        snapshot.overview_complete,
        snapshot.role_count >= 1,
        snapshot.step_count >= MIN_STEPS,
        snapshot.data_asset_count >= 1,
        snapshot.application_count >= 1,
        snapshot.rule_count + snapshot.sla_count >= 1,
        snapshot
            .metrics
            .as_ref()
            .is_some_and(|m| m.baseline_volume > 0.0),
    ];
    let satisfied = checks.iter().filter(|done| **done).count();
    satisfied as f64 / CHECKLIST_DIMENSIONS as f64
}
