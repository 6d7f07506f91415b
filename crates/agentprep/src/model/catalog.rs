//! Catalog entities owned by a use case.
//!
//! Every entity implements [`CatalogEntity`], which is what lets the store,
//! the remote client, and the dispatcher handle all seven collections with a
//! single set of generic operations.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{EntityKind, UseCaseRecord};
use crate::process;

/// A catalog record points somewhere it may not.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReferenceError {
    #[error("{kind} '{id}' not found")]
    Missing { kind: EntityKind, id: String },

    #[error("step '{id}' cannot be nested under '{parent_id}', which is the step itself or one of its descendants")]
    Cycle { id: String, parent_id: String },
}

/// A record stored in one of a use case's catalog collections.
pub trait CatalogEntity:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const KIND: EntityKind;

    /// Keys a merge patch may never overwrite.
    const PROTECTED_FIELDS: &'static [&'static str] = &["id", "use_case_id", "created_at"];

    fn id(&self) -> &str;

    /// Gives a new record its identity when it is first stored.
    fn assign(&mut self, id: String, use_case_id: &str, now: DateTime<Utc>);

    /// Points the record at a (possibly new) owning use case, keeping its id.
    fn rehome(&mut self, use_case_id: &str);

    fn touch(&mut self, now: DateTime<Utc>);

    fn items(record: &UseCaseRecord) -> &[Self];

    fn items_mut(record: &mut UseCaseRecord) -> &mut Vec<Self>;

    /// Checks what this record points at against `record`: referenced
    /// records must exist and a hierarchy must stay acyclic.
    fn check_references(&self, _record: &UseCaseRecord) -> Result<(), ReferenceError> {
        Ok(())
    }

    /// Recomputes values derived from references after the collection changed.
    fn normalize(_record: &mut UseCaseRecord) {}

    /// Removes the record with `id` plus anything that depends on it.
    ///
    /// Returns the ids that were removed; empty when `id` was not present.
    fn remove(record: &mut UseCaseRecord, id: &str) -> Vec<String> {
        let items = Self::items_mut(record);
        let before = items.len();
        items.retain(|item| item.id() != id);
        if items.len() < before {
            vec![id.to_string()]
        } else {
            Vec::new()
        }
    }
}

macro_rules! owned_by_use_case {
    ($ty:ty, $kind:expr, $field:ident $(, { $($extra:tt)* })?) => {
        impl CatalogEntity for $ty {
            const KIND: EntityKind = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn assign(&mut self, id: String, use_case_id: &str, now: DateTime<Utc>) {
                self.id = id;
                self.use_case_id = use_case_id.to_string();
                self.created_at = now;
                self.updated_at = None;
            }

            fn rehome(&mut self, use_case_id: &str) {
                self.use_case_id = use_case_id.to_string();
            }

            fn touch(&mut self, now: DateTime<Utc>) {
                self.updated_at = Some(now);
            }

            fn items(record: &UseCaseRecord) -> &[Self] {
                &record.$field
            }

            fn items_mut(record: &mut UseCaseRecord) -> &mut Vec<Self> {
                &mut record.$field
            }

            $($($extra)*)?
        }
    };
}

// ─── Roles ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleType {
    #[default]
    Human,
    Agent,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub role_type: RoleType,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(name: impl Into<String>, role_type: RoleType) -> Self {
        Self {
            id: String::new(),
            use_case_id: String::new(),
            name: name.into(),
            role_type,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

owned_by_use_case!(Role, EntityKind::Role, roles);

// ─── Process steps ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Trigger,
    #[default]
    Task,
    Decision,
    Approval,
    Wait,
}

/// One node of a use case's process tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub step_type: StepType,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_time_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_rate: Option<f64>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProcessStep {
    pub fn new(title: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: String::new(),
            use_case_id: String::new(),
            parent_id: None,
            title: title.into(),
            description: String::new(),
            step_type,
            role: String::new(),
            level: 0,
            order_index: 0,
            avg_time_minutes: None,
            volume_per_day: None,
            exception_rate: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Nests this step under `parent`, one level deeper.
    pub fn child_of(mut self, parent: &ProcessStep) -> Self {
        self.parent_id = Some(parent.id.clone());
        self.level = parent.level + 1;
        self
    }
}

owned_by_use_case!(ProcessStep, EntityKind::ProcessStep, steps, {
    fn check_references(&self, record: &UseCaseRecord) -> Result<(), ReferenceError> {
        let Some(parent_id) = self.parent_id.as_ref() else {
            return Ok(());
        };
        if !record.steps.iter().any(|step| &step.id == parent_id) {
            return Err(ReferenceError::Missing {
                kind: EntityKind::ProcessStep,
                id: parent_id.clone(),
            });
        }
        if parent_id == &self.id
            || process::collect_subtree(&record.steps, &self.id).contains(parent_id)
        {
            return Err(ReferenceError::Cycle {
                id: self.id.clone(),
                parent_id: parent_id.clone(),
            });
        }
        Ok(())
    }

    fn normalize(record: &mut UseCaseRecord) {
        process::assign_levels(&mut record.steps);
    }

    fn remove(record: &mut UseCaseRecord, id: &str) -> Vec<String> {
        let doomed = process::collect_subtree(&record.steps, id);
        if doomed.is_empty() {
            return Vec::new();
        }
        let lookup: HashSet<&str> = doomed.iter().map(String::as_str).collect();
        record.steps.retain(|step| !lookup.contains(step.id.as_str()));
        doomed
    }
});

// ─── Data assets ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    #[default]
    Table,
    Api,
    File,
    Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAsset {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    pub name: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub object_type: ObjectType,
    #[serde(default)]
    pub has_pii: bool,
    /// 1 (poor) to 5 (excellent).
    #[serde(default = "default_quality_score")]
    pub quality_score: u8,
    #[serde(default)]
    pub fields: Vec<DataField>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_quality_score() -> u8 {
    3
}

impl DataAsset {
    pub fn new(name: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            use_case_id: String::new(),
            name: name.into(),
            system: system.into(),
            object_type: ObjectType::default(),
            has_pii: false,
            quality_score: default_quality_score(),
            fields: Vec::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

owned_by_use_case!(DataAsset, EntityKind::DataAsset, data_assets);

// ─── Applications & connectors ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationType {
    #[default]
    Saas,
    Onprem,
    Database,
    Api,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    #[default]
    None,
    Apikey,
    Oauth,
    Basic,
    Bearer,
    Saml,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub app_type: ApplicationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default)]
    pub auth_type: AuthType,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Application {
    pub fn new(name: impl Into<String>, app_type: ApplicationType) -> Self {
        Self {
            id: String::new(),
            use_case_id: String::new(),
            name: name.into(),
            app_type,
            vendor: None,
            auth_type: AuthType::default(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

owned_by_use_case!(Application, EntityKind::Application, applications, {
    fn remove(record: &mut UseCaseRecord, id: &str) -> Vec<String> {
        let before = record.applications.len();
        record.applications.retain(|app| app.id != id);
        if record.applications.len() == before {
            return Vec::new();
        }

        let mut removed = vec![id.to_string()];
        record.connectors.retain(|connector| {
            if connector.application_id == id {
                removed.push(connector.id.clone());
                false
            } else {
                true
            }
        });
        removed
    }
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectorType {
    #[default]
    #[serde(rename = "HTTP")]
    Http,
    #[serde(rename = "SQL")]
    Sql,
    GraphQL,
    Search,
    File,
}

/// An integration point on one application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default)]
    pub id: String,
    pub application_id: String,
    pub name: String,
    #[serde(default)]
    pub connector_type: ConnectorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Connector {
    pub fn new(
        application_id: impl Into<String>,
        name: impl Into<String>,
        connector_type: ConnectorType,
    ) -> Self {
        Self {
            id: String::new(),
            application_id: application_id.into(),
            name: name.into(),
            connector_type,
            endpoint: None,
            timeout_ms: None,
            max_retries: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

impl CatalogEntity for Connector {
    const KIND: EntityKind = EntityKind::Connector;
    const PROTECTED_FIELDS: &'static [&'static str] = &["id", "application_id", "created_at"];

    fn id(&self) -> &str {
        &self.id
    }

    fn assign(&mut self, id: String, _use_case_id: &str, now: DateTime<Utc>) {
        self.id = id;
        self.created_at = now;
        self.updated_at = None;
    }

    // Connectors hang off an application, not the use case directly.
    fn rehome(&mut self, _use_case_id: &str) {}

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    fn items(record: &UseCaseRecord) -> &[Self] {
        &record.connectors
    }

    fn items_mut(record: &mut UseCaseRecord) -> &mut Vec<Self> {
        &mut record.connectors
    }

    fn check_references(&self, record: &UseCaseRecord) -> Result<(), ReferenceError> {
        if record
            .applications
            .iter()
            .any(|app| app.id == self.application_id)
        {
            Ok(())
        } else {
            Err(ReferenceError::Missing {
                kind: EntityKind::Application,
                id: self.application_id.clone(),
            })
        }
    }
}

// ─── Business rules ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    #[default]
    Validation,
    Eligibility,
    Routing,
    Pricing,
    Compliance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessRule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: RuleCategory,
    /// Free-text pseudo-code; never evaluated.
    #[serde(default)]
    pub expression: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BusinessRule {
    pub fn new(name: impl Into<String>, category: RuleCategory) -> Self {
        Self {
            id: String::new(),
            use_case_id: String::new(),
            name: name.into(),
            description: String::new(),
            category,
            expression: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

owned_by_use_case!(BusinessRule, EntityKind::BusinessRule, rules);

// ─── SLAs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlaUnit {
    Seconds,
    #[default]
    Minutes,
    Hours,
    Percent,
    Count,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sla {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub use_case_id: String,
    pub metric: String,
    pub threshold: String,
    #[serde(default)]
    pub unit: SlaUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Sla {
    pub fn new(metric: impl Into<String>, threshold: impl Into<String>, unit: SlaUnit) -> Self {
        Self {
            id: String::new(),
            use_case_id: String::new(),
            metric: metric.into(),
            threshold: threshold.into(),
            unit,
            window: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }
}

owned_by_use_case!(Sla, EntityKind::Sla, slas);
