//! Portable snapshot of one use case and its catalogs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    Application, BusinessRule, Connector, DataAsset, Metrics, ProcessStep, Readiness, Role,
    RoiResults, Sla, UseCase, UseCaseRecord,
};

pub const PACK_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessSection {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub steps: Vec<ProcessStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCasePack {
    pub use_case: UseCase,
    #[serde(default)]
    pub process: ProcessSection,
    #[serde(default)]
    pub data_assets: Vec<DataAsset>,
    #[serde(default)]
    pub applications: Vec<Application>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
    #[serde(default)]
    pub rules: Vec<BusinessRule>,
    #[serde(default)]
    pub slas: Vec<Sla>,
    #[serde(default)]
    pub metrics: Option<Metrics>,
    #[serde(default)]
    pub readiness: Option<Readiness>,
    #[serde(default)]
    pub roi: Option<RoiResults>,
    pub exported_at: DateTime<Utc>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    PACK_VERSION.to_string()
}

impl UseCasePack {
    /// Packs `record`. Derived scores are supplied by the caller because they
    /// are computed at export time, not stored.
    pub fn from_record(
        record: &UseCaseRecord,
        readiness: Option<Readiness>,
        roi: Option<RoiResults>,
    ) -> Self {
        Self {
            use_case: record.use_case.clone(),
            process: ProcessSection {
                roles: record.roles.clone(),
                steps: record.steps.clone(),
            },
            data_assets: record.data_assets.clone(),
            applications: record.applications.clone(),
            connectors: record.connectors.clone(),
            rules: record.rules.clone(),
            slas: record.slas.clone(),
            metrics: record.metrics.clone(),
            readiness,
            roi,
            exported_at: Utc::now(),
            version: default_version(),
        }
    }

    /// Unpacks into a record, leaving ids and foreign keys untouched.
    pub fn into_record(self) -> UseCaseRecord {
        UseCaseRecord {
            use_case: self.use_case,
            roles: self.process.roles,
            steps: self.process.steps,
            data_assets: self.data_assets,
            applications: self.applications,
            connectors: self.connectors,
            rules: self.rules,
            slas: self.slas,
            metrics: self.metrics,
        }
    }
}
