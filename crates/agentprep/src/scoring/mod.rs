//! Derived metrics: ROI projection and automation readiness.
//!
//! Pure functions over a [`CatalogSnapshot`]. Nothing here is stored; callers
//! recompute whenever they need a fresh view, so results cannot drift from
//! the data they were derived from. Missing inputs never produce errors, only
//! `None` (ROI) or low scores (readiness).

mod completion;
mod readiness;
mod roi;

use serde::{Deserialize, Serialize};

use crate::model::{Metrics, UseCasePack, UseCaseRecord};

pub use completion::{completion_ratio, CHECKLIST_DIMENSIONS};
pub use readiness::compute_readiness;
pub use roi::{compute_roi, WORKING_DAYS_PER_YEAR};

/// Read-only view of everything the calculator looks at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub use_case_id: String,
    pub overview_complete: bool,
    pub metrics: Option<Metrics>,
    pub role_count: usize,
    pub step_count: usize,
    pub data_asset_count: usize,
    pub application_count: usize,
    pub connector_count: usize,
    pub rule_count: usize,
    pub sla_count: usize,
}

impl CatalogSnapshot {
    pub fn from_record(record: &UseCaseRecord) -> Self {
        Self {
            use_case_id: record.use_case.id.clone(),
            overview_complete: record.use_case.overview_complete(),
            metrics: record.metrics.clone(),
            role_count: record.roles.len(),
            step_count: record.steps.len(),
            data_asset_count: record.data_assets.len(),
            application_count: record.applications.len(),
            connector_count: record.connectors.len(),
            rule_count: record.rules.len(),
            sla_count: record.slas.len(),
        }
    }

    pub fn from_pack(pack: &UseCasePack) -> Self {
        Self {
            use_case_id: pack.use_case.id.clone(),
            overview_complete: pack.use_case.overview_complete(),
            metrics: pack.metrics.clone(),
            role_count: pack.process.roles.len(),
            step_count: pack.process.steps.len(),
            data_asset_count: pack.data_assets.len(),
            application_count: pack.applications.len(),
            connector_count: pack.connectors.len(),
            rule_count: pack.rules.len(),
            sla_count: pack.slas.len(),
        }
    }
}

/// Rounds to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Role, RoleType, UseCase};

    #[test]
    fn test_round1() {
        assert_eq!(round1(2.345), 2.3);
        assert_eq!(round1(4.96), 5.0);
        assert_eq!(round1(2.0), 2.0);
    }

    #[test]
    fn test_snapshot_counts_record() {
        let mut record = UseCaseRecord::new(UseCase::new("U1", "Refunds"));
        record.use_case.id = "uc-1".into();
        record.roles.push(Role::new("Clerk", RoleType::Human));
        record.roles.push(Role::new("Bot", RoleType::Agent));

        let snapshot = CatalogSnapshot::from_record(&record);
        assert_eq!(snapshot.use_case_id, "uc-1");
        assert_eq!(snapshot.role_count, 2);
        assert_eq!(snapshot.step_count, 0);
        assert!(!snapshot.overview_complete);
    }

    #[test]
    fn test_snapshot_from_pack_matches_record() {
        let mut record = UseCaseRecord::new(UseCase::new("U1", "Refunds"));
        record.roles.push(Role::new("Clerk", RoleType::Human));
        let pack = UseCasePack::from_record(&record, None, None);
        assert_eq!(
            CatalogSnapshot::from_pack(&pack),
            CatalogSnapshot::from_record(&record)
        );
    }
}
