//! Local persistence store.
//!
//! Serves the same operations as the remote API from a single serialized
//! blob. Every mutation is applied to a copy of the state, written to the
//! backend, and only then published, so a failed save changes nothing.
//! Reads hand out clones; callers never hold references into the store.

mod backend;
mod error;

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use backend::{MemoryBackend, SqliteBackend, StorageBackend};
pub use error::StoreError;

use crate::config::{StoreBackendKind, StoreConfig};
use crate::db::default_database_path;
use crate::model::{
    apply_patch, new_id, Application, BusinessRule, CatalogEntity, Connector, DataAsset,
    EntityKind, Metrics, ProcessStep, Readiness, Role, RoiResults, Sla, UseCase, UseCaseFilter,
    UseCasePack, UseCaseRecord, PACK_VERSION,
};
use crate::process::{build_process_tree, ProcessNode};
use crate::scoring::{completion_ratio, compute_readiness, compute_roi, CatalogSnapshot};

/// Storage key used when none is configured.
pub const DEFAULT_STORE_KEY: &str = "agentprep:store:v1";

const USE_CASE_PROTECTED_FIELDS: &[&str] = &["id", "owner_id", "created_at"];

/// Everything the store holds, keyed by use-case id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreState {
    #[serde(default)]
    use_cases: BTreeMap<String, UseCaseRecord>,
}

impl StoreState {
    fn record(&self, use_case_id: &str) -> Result<&UseCaseRecord, StoreError> {
        self.use_cases
            .get(use_case_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::UseCase, use_case_id))
    }

    fn record_mut(&mut self, use_case_id: &str) -> Result<&mut UseCaseRecord, StoreError> {
        self.use_cases
            .get_mut(use_case_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::UseCase, use_case_id))
    }

    fn owned_by<'a>(&'a self, owner_id: &'a str) -> impl Iterator<Item = &'a UseCaseRecord> + 'a {
        self.use_cases
            .values()
            .filter(move |record| record.use_case.owner_id == owner_id)
    }
}

pub struct LocalStore {
    backend: Box<dyn StorageBackend>,
    key: String,
    state: RwLock<StoreState>,
}

impl LocalStore {
    /// Loads the store from `backend`. An empty slot starts an empty store.
    pub fn open(
        backend: Box<dyn StorageBackend>,
        key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = key.into();
        let state = match backend.load(&key)? {
            Some(blob) => serde_json::from_str(&blob).map_err(|source| StoreError::Decode {
                key: key.clone(),
                source,
            })?,
            None => StoreState::default(),
        };
        log::debug!(
            "Local store '{}' loaded with {} use case(s)",
            key,
            state.use_cases.len()
        );

        Ok(Self {
            backend,
            key,
            state: RwLock::new(state),
        })
    }

    /// An empty store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            key: DEFAULT_STORE_KEY.to_string(),
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let backend: Box<dyn StorageBackend> = match config.backend {
            StoreBackendKind::Memory => Box::new(MemoryBackend::new()),
            StoreBackendKind::Sqlite => {
                let path = config
                    .path
                    .clone()
                    .or_else(default_database_path)
                    .ok_or_else(|| {
                        StoreError::Unavailable(
                            "no store path configured and no home directory found".to_string(),
                        )
                    })?;
                Box::new(SqliteBackend::open(&path)?)
            }
        };
        Self::open(backend, config.key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // ─── Locking ────────────────────────────────────────────────────────────

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState> {
        match self.state.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Local store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState> {
        match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("Local store lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Applies `op` to a copy of the state, persists it, then publishes it.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.write_state();
        let mut next = guard.clone();
        let out = op(&mut next)?;

        let blob = serde_json::to_string(&next).map_err(StoreError::Serialize)?;
        self.backend.save(&self.key, &blob)?;
        *guard = next;
        Ok(out)
    }

    // ─── Use cases ──────────────────────────────────────────────────────────

    pub fn create_use_case(&self, mut use_case: UseCase) -> Result<UseCase, StoreError> {
        use_case.id = new_id();
        use_case.created_at = Utc::now();
        use_case.updated_at = None;

        self.mutate(|state| {
            state
                .use_cases
                .insert(use_case.id.clone(), UseCaseRecord::new(use_case.clone()));
            Ok(())
        })?;
        log::debug!("Created use case {}", use_case.id);
        Ok(use_case)
    }

    pub fn get_use_case(&self, id: &str) -> Result<UseCase, StoreError> {
        Ok(self.read_state().record(id)?.use_case.clone())
    }

    pub fn update_use_case(&self, id: &str, patch: &Value) -> Result<UseCase, StoreError> {
        self.mutate(|state| {
            let record = state.record_mut(id)?;
            let mut updated = apply_patch(&record.use_case, patch, USE_CASE_PROTECTED_FIELDS)
                .map_err(|source| StoreError::InvalidPatch {
                    kind: EntityKind::UseCase,
                    source,
                })?;
            updated.updated_at = Some(Utc::now());
            record.use_case = updated.clone();
            Ok(updated)
        })
    }

    /// Use cases owned by `owner_id`, most recently touched first.
    pub fn list_use_cases(&self, owner_id: &str) -> Vec<UseCase> {
        self.query_use_cases(owner_id, &UseCaseFilter::default())
    }

    /// Like [`list_use_cases`](Self::list_use_cases), narrowed and paged by
    /// `filter`.
    pub fn query_use_cases(&self, owner_id: &str, filter: &UseCaseFilter) -> Vec<UseCase> {
        let state = self.read_state();
        let mut matched: Vec<&UseCase> = state
            .owned_by(owner_id)
            .map(|record| &record.use_case)
            .filter(|uc| uc.matches(filter))
            .collect();
        matched.sort_by_key(|uc| std::cmp::Reverse(uc.last_touched()));
        matched
            .into_iter()
            .skip(filter.offset)
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    /// Removes the use case and everything it owns.
    pub fn delete_use_case(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|state| {
            state
                .use_cases
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| StoreError::not_found(EntityKind::UseCase, id))
        })?;
        log::debug!("Deleted use case {}", id);
        Ok(())
    }

    // ─── Catalog entities ───────────────────────────────────────────────────

    pub fn list<E: CatalogEntity>(&self, use_case_id: &str) -> Result<Vec<E>, StoreError> {
        Ok(E::items(self.read_state().record(use_case_id)?).to_vec())
    }

    pub fn get<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> Result<E, StoreError> {
        let state = self.read_state();
        E::items(state.record(use_case_id)?)
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(E::KIND, id))
    }

    /// Stores `entity` under a fresh id.
    ///
    /// Fails with `NotFound` when the use case, or anything the entity
    /// points at (parent step, owning application), does not exist.
    pub fn create<E: CatalogEntity>(&self, use_case_id: &str, mut entity: E) -> Result<E, StoreError> {
        entity.assign(new_id(), use_case_id, Utc::now());

        let created = self.mutate(|state| {
            let record = state.record_mut(use_case_id)?;
            entity
                .check_references(record)
                .map_err(|err| StoreError::from_reference(E::KIND, err))?;
            E::items_mut(record).push(entity.clone());
            E::normalize(record);
            stored::<E>(record, entity.id())
        })?;
        log::debug!(
            "Created {} {} in use case {}",
            E::KIND,
            created.id(),
            use_case_id
        );
        Ok(created)
    }

    /// Merges `patch` onto the entity. A step may not be moved under itself
    /// or one of its descendants.
    pub fn update<E: CatalogEntity>(
        &self,
        use_case_id: &str,
        id: &str,
        patch: &Value,
    ) -> Result<E, StoreError> {
        self.mutate(|state| {
            let record = state.record_mut(use_case_id)?;
            let index = E::items(record)
                .iter()
                .position(|item| item.id() == id)
                .ok_or_else(|| StoreError::not_found(E::KIND, id))?;

            let mut updated = apply_patch(&E::items(record)[index], patch, E::PROTECTED_FIELDS)
                .map_err(|source| StoreError::InvalidPatch {
                    kind: E::KIND,
                    source,
                })?;
            updated
                .check_references(record)
                .map_err(|err| StoreError::from_reference(E::KIND, err))?;
            updated.touch(Utc::now());

            E::items_mut(record)[index] = updated;
            E::normalize(record);
            stored::<E>(record, id)
        })
    }

    /// Deletes the entity and its dependents in one write.
    ///
    /// Returns every removed id: a step's whole subtree, or an application
    /// together with its connectors.
    pub fn delete<E: CatalogEntity>(
        &self,
        use_case_id: &str,
        id: &str,
    ) -> Result<Vec<String>, StoreError> {
        let removed = self.mutate(|state| {
            let removed = E::remove(state.record_mut(use_case_id)?, id);
            if removed.is_empty() {
                return Err(StoreError::not_found(E::KIND, id));
            }
            Ok(removed)
        })?;
        log::debug!(
            "Deleted {} {} from use case {} ({} record(s))",
            E::KIND,
            id,
            use_case_id,
            removed.len()
        );
        Ok(removed)
    }

    // ─── Metrics and derived values ─────────────────────────────────────────

    pub fn get_metrics(&self, use_case_id: &str) -> Result<Option<Metrics>, StoreError> {
        Ok(self.read_state().record(use_case_id)?.metrics.clone())
    }

    /// Replaces the use case's metrics.
    pub fn update_metrics(
        &self,
        use_case_id: &str,
        mut metrics: Metrics,
    ) -> Result<Metrics, StoreError> {
        metrics.use_case_id = use_case_id.to_string();
        metrics.updated_at = Some(Utc::now());

        self.mutate(|state| {
            state.record_mut(use_case_id)?.metrics = Some(metrics.clone());
            Ok(metrics)
        })
    }

    pub fn get_roi(&self, use_case_id: &str) -> Result<Option<RoiResults>, StoreError> {
        let state = self.read_state();
        Ok(derive_roi(state.record(use_case_id)?))
    }

    pub fn get_readiness(&self, use_case_id: &str) -> Result<Readiness, StoreError> {
        let state = self.read_state();
        let snapshot = CatalogSnapshot::from_record(state.record(use_case_id)?);
        Ok(compute_readiness(&snapshot))
    }

    /// Use cases whose readiness reaches `min_score`, best first.
    pub fn rank_by_readiness(&self, owner_id: &str, min_score: f64) -> Vec<(UseCase, Readiness)> {
        let state = self.read_state();
        let mut ranked: Vec<(UseCase, Readiness)> = state
            .owned_by(owner_id)
            .map(|record| {
                let readiness = compute_readiness(&CatalogSnapshot::from_record(record));
                (record.use_case.clone(), readiness)
            })
            .filter(|(_, readiness)| readiness.overall_score >= min_score)
            .collect();
        ranked.sort_by(|(a_uc, a), (b_uc, b)| {
            b.overall_score
                .total_cmp(&a.overall_score)
                .then_with(|| b_uc.last_touched().cmp(&a_uc.last_touched()))
        });
        ranked
    }

    pub fn process_tree(&self, use_case_id: &str) -> Result<Vec<ProcessNode>, StoreError> {
        Ok(build_process_tree(&self.read_state().record(use_case_id)?.steps))
    }

    // ─── Packs ──────────────────────────────────────────────────────────────

    /// Snapshots the use case with freshly computed readiness and ROI.
    pub fn export_use_case(&self, id: &str) -> Result<UseCasePack, StoreError> {
        let state = self.read_state();
        let record = state.record(id)?;
        let readiness = compute_readiness(&CatalogSnapshot::from_record(record));
        Ok(UseCasePack::from_record(
            record,
            Some(readiness),
            derive_roi(record),
        ))
    }

    /// Stores `pack` as a brand-new use case owned by `owner_id`.
    ///
    /// Nested records keep their ids and are re-pointed at the new use case.
    /// A pack whose steps or connectors point at records it does not carry,
    /// or whose steps form a cycle, is rejected with `InvalidPack`.
    pub fn import_use_case(&self, pack: UseCasePack, owner_id: &str) -> Result<UseCase, StoreError> {
        if pack.version != PACK_VERSION {
            log::warn!(
                "Importing pack version '{}', expected '{}'",
                pack.version,
                PACK_VERSION
            );
        }

        let mut record = pack.into_record();
        let id = new_id();
        let now = Utc::now();
        record.use_case.id = id.clone();
        record.use_case.owner_id = owner_id.to_string();
        record.use_case.created_at = now;
        record.use_case.updated_at = Some(now);
        rehome_all(&mut record, &id);
        check_integrity(&record)?;
        ProcessStep::normalize(&mut record);

        let use_case = record.use_case.clone();
        self.mutate(|state| {
            state.use_cases.insert(id.clone(), record);
            Ok(())
        })?;
        log::info!("Imported use case {} for owner {}", use_case.id, owner_id);
        Ok(use_case)
    }
}

fn derive_roi(record: &UseCaseRecord) -> Option<RoiResults> {
    let metrics = record.metrics.as_ref()?;
    let ratio = completion_ratio(&CatalogSnapshot::from_record(record));
    let mut roi = compute_roi(metrics, ratio)?;
    roi.use_case_id = record.use_case.id.clone();
    Some(roi)
}

/// Reads back the entity with `id` as it now sits in `record`.
fn stored<E: CatalogEntity>(record: &UseCaseRecord, id: &str) -> Result<E, StoreError> {
    E::items(record)
        .iter()
        .find(|item| item.id() == id)
        .cloned()
        .ok_or_else(|| StoreError::not_found(E::KIND, id))
}

fn check_integrity(record: &UseCaseRecord) -> Result<(), StoreError> {
    fn check<E: CatalogEntity>(record: &UseCaseRecord) -> Result<(), StoreError> {
        E::items(record)
            .iter()
            .try_for_each(|item| item.check_references(record))
            .map_err(StoreError::InvalidPack)
    }

    check::<ProcessStep>(record)?;
    check::<Connector>(record)
}

fn rehome_all(record: &mut UseCaseRecord, use_case_id: &str) {
    fn rehome<E: CatalogEntity>(record: &mut UseCaseRecord, use_case_id: &str) {
        for item in E::items_mut(record) {
            item.rehome(use_case_id);
        }
    }

    rehome::<Role>(record, use_case_id);
    rehome::<ProcessStep>(record, use_case_id);
    rehome::<DataAsset>(record, use_case_id);
    rehome::<Application>(record, use_case_id);
    rehome::<Connector>(record, use_case_id);
    rehome::<BusinessRule>(record, use_case_id);
    rehome::<Sla>(record, use_case_id);
    if let Some(metrics) = record.metrics.as_mut() {
        metrics.use_case_id = use_case_id.to_string();
    }
}
