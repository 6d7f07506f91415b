use serde::{Deserialize, Serialize};

use super::{
    Application, BusinessRule, Connector, DataAsset, Metrics, ProcessStep, Role, Sla, UseCase,
};

/// A use case together with everything it owns.
///
/// This is the unit the local store persists and the unit an export pack is
/// built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseRecord {
    pub use_case: UseCase,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub steps: Vec<ProcessStep>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
}

impl UseCaseRecord {
    pub fn new(use_case: UseCase) -> Self {
        Self {
            use_case,
            roles: Vec::new(),
            steps: Vec::new(),
            data_assets: Vec::new(),
            applications: Vec::new(),
            connectors: Vec::new(),
            rules: Vec::new(),
            slas: Vec::new(),
            metrics: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.use_case.id
    }
}

impl Default for UseCaseRecord {
    fn default() -> Self {
        Self::new(UseCase::new(String::new(), String::new()))
    }
}
