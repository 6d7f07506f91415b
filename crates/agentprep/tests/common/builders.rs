//! Builder patterns and fixtures for test data.

#![allow(dead_code)]

use agentprep::model::{
    Application, ApplicationType, BusinessRule, Connector, ConnectorType, DataAsset, Metrics,
    Priority, ProcessStep, Role, RoleType, RuleCategory, Sla, SlaUnit, Status, StepType, UseCase,
};
use agentprep::LocalStore;

/// Builder for unsaved `UseCase` values.
pub struct UseCaseBuilder {
    use_case: UseCase,
}

impl UseCaseBuilder {
    pub fn new(owner_id: &str, name: &str) -> Self {
        Self {
            use_case: UseCase::new(owner_id, name),
        }
    }

    /// Fills objective and scope so the overview counts as complete.
    pub fn with_overview(mut self) -> Self {
        self.use_case.objective = "Cut manual handling time".to_string();
        self.use_case.scope = "Inbound requests to fulfilment".to_string();
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.use_case.tags.insert(tag.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.use_case.priority = priority;
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.use_case.status = status;
        self
    }

    pub fn build(self) -> UseCase {
        self.use_case
    }
}

/// Metrics from the reference ROI scenario.
pub fn reference_metrics() -> Metrics {
    Metrics::new(500.0, 15.0, 45.0, 0.05, 250.0)
}

/// Ids of the records created by [`populate_catalog`].
pub struct CatalogIds {
    pub root_step: String,
    pub child_steps: Vec<String>,
    pub grandchild_step: String,
    pub other_root_step: String,
    pub crm: String,
    pub erp: String,
    pub crm_connectors: Vec<String>,
    pub erp_connector: String,
}

/// Creates a use case that satisfies every checklist item.
///
/// Steps: `root` with two children, one grandchild under the first child,
/// plus an unrelated root. Applications: CRM with two connectors, ERP with one.
pub fn populate_catalog(store: &LocalStore, owner_id: &str) -> (UseCase, CatalogIds) {
    let uc = store
        .create_use_case(
            UseCaseBuilder::new(owner_id, "Order intake")
                .with_overview()
                .tag("sales")
                .build(),
        )
        .unwrap();
    let id = uc.id.as_str();

    store.create(id, Role::new("Sales clerk", RoleType::Human)).unwrap();
    store.create(id, Role::new("Intake agent", RoleType::Agent)).unwrap();

    let root = store
        .create(id, ProcessStep::new("Receive order", StepType::Trigger))
        .unwrap();
    let validate = store
        .create(id, ProcessStep::new("Validate", StepType::Task).child_of(&root))
        .unwrap();
    let enrich = store
        .create(id, ProcessStep::new("Enrich", StepType::Task).child_of(&root))
        .unwrap();
    let lookup = store
        .create(id, ProcessStep::new("Credit lookup", StepType::Decision).child_of(&validate))
        .unwrap();
    let archive = store
        .create(id, ProcessStep::new("Archive", StepType::Task))
        .unwrap();

    store.create(id, DataAsset::new("Orders", "ERP")).unwrap();

    let crm = store
        .create(id, Application::new("CRM", ApplicationType::Saas))
        .unwrap();
    let erp = store
        .create(id, Application::new("ERP", ApplicationType::Onprem))
        .unwrap();
    let crm_a = store
        .create(id, Connector::new(crm.id.clone(), "Accounts", ConnectorType::Http))
        .unwrap();
    let crm_b = store
        .create(id, Connector::new(crm.id.clone(), "Contacts", ConnectorType::GraphQL))
        .unwrap();
    let erp_conn = store
        .create(id, Connector::new(erp.id.clone(), "Orders", ConnectorType::Sql))
        .unwrap();

    store
        .create(id, BusinessRule::new("Credit limit", RuleCategory::Eligibility))
        .unwrap();
    store
        .create(id, Sla::new("Time to confirm", "4", SlaUnit::Hours))
        .unwrap();
    store.update_metrics(id, reference_metrics()).unwrap();

    let ids = CatalogIds {
        root_step: root.id,
        child_steps: vec![validate.id, enrich.id],
        grandchild_step: lookup.id,
        other_root_step: archive.id,
        crm: crm.id,
        erp: erp.id,
        crm_connectors: vec![crm_a.id, crm_b.id],
        erp_connector: erp_conn.id,
    };
    (uc, ids)
}
