//! Record shapes for use cases and their catalogs.
//!
//! Everything here is plain data: the same structs travel over the REST API,
//! live inside the local store blob, and feed the scoring functions.

pub mod catalog;
pub mod metrics;
pub mod pack;
pub mod patch;
pub mod record;
pub mod use_case;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use catalog::{
    Application, ApplicationType, AuthType, BusinessRule, CatalogEntity, Connector, ConnectorType,
    DataAsset, DataField, ObjectType, ProcessStep, ReferenceError, Role, RoleType, RuleCategory,
    Sla, SlaUnit, StepType,
};
pub use metrics::{Metrics, Readiness, RoiResults};
pub use pack::{ProcessSection, UseCasePack, PACK_VERSION};
pub use patch::{apply_patch, PatchError};
pub use record::UseCaseRecord;
pub use use_case::{Priority, Status, UseCase, UseCaseFilter};

/// Kinds of records addressable through the store and the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    UseCase,
    Role,
    ProcessStep,
    DataAsset,
    Application,
    Connector,
    BusinessRule,
    Sla,
    Metrics,
}

impl EntityKind {
    /// URL segment used under `/api/use-cases/{id}/`.
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::UseCase => "",
            EntityKind::Role => "roles",
            EntityKind::ProcessStep => "steps",
            EntityKind::DataAsset => "data-assets",
            EntityKind::Application => "applications",
            EntityKind::Connector => "connectors",
            EntityKind::BusinessRule => "rules",
            EntityKind::Sla => "slas",
            EntityKind::Metrics => "metrics",
        }
    }

    /// Body field naming the target of a `DELETE` on a collection route.
    pub fn id_field(&self) -> &'static str {
        match self {
            EntityKind::UseCase => "useCaseId",
            EntityKind::Role => "roleId",
            EntityKind::ProcessStep => "stepId",
            EntityKind::DataAsset => "assetId",
            EntityKind::Application => "applicationId",
            EntityKind::Connector => "connectorId",
            EntityKind::BusinessRule => "ruleId",
            EntityKind::Sla => "slaId",
            EntityKind::Metrics => "metricsId",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::UseCase => "use case",
            EntityKind::Role => "role",
            EntityKind::ProcessStep => "process step",
            EntityKind::DataAsset => "data asset",
            EntityKind::Application => "application",
            EntityKind::Connector => "connector",
            EntityKind::BusinessRule => "business rule",
            EntityKind::Sla => "SLA",
            EntityKind::Metrics => "metrics",
        };
        f.write_str(name)
    }
}

/// Generates a fresh record identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
