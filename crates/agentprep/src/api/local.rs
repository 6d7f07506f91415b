//! [`AgentPrepApi`] over the local store.

use async_trait::async_trait;
use serde_json::Value;

use super::{AgentPrepApi, ApiResult};
use crate::model::{CatalogEntity, Metrics, Readiness, RoiResults, UseCase, UseCasePack};
use crate::store::LocalStore;

#[async_trait]
impl AgentPrepApi for LocalStore {
    async fn create_use_case(&self, use_case: UseCase) -> ApiResult<UseCase> {
        Ok(LocalStore::create_use_case(self, use_case)?)
    }

    async fn get_use_case(&self, id: &str) -> ApiResult<UseCase> {
        Ok(LocalStore::get_use_case(self, id)?)
    }

    async fn update_use_case(&self, id: &str, patch: &Value) -> ApiResult<UseCase> {
        Ok(LocalStore::update_use_case(self, id, patch)?)
    }

    async fn list_use_cases(&self, owner_id: &str) -> ApiResult<Vec<UseCase>> {
        Ok(LocalStore::list_use_cases(self, owner_id))
    }

    async fn delete_use_case(&self, id: &str) -> ApiResult<()> {
        Ok(LocalStore::delete_use_case(self, id)?)
    }

    async fn list<E: CatalogEntity>(&self, use_case_id: &str) -> ApiResult<Vec<E>> {
        Ok(LocalStore::list(self, use_case_id)?)
    }

    async fn get<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<E> {
        Ok(LocalStore::get(self, use_case_id, id)?)
    }

    async fn create<E: CatalogEntity>(&self, use_case_id: &str, entity: E) -> ApiResult<E> {
        Ok(LocalStore::create(self, use_case_id, entity)?)
    }

    async fn update<E: CatalogEntity>(
        &self,
        use_case_id: &str,
        id: &str,
        patch: &Value,
    ) -> ApiResult<E> {
        Ok(LocalStore::update(self, use_case_id, id, patch)?)
    }

    async fn delete<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<()> {
        LocalStore::delete::<E>(self, use_case_id, id)?;
        Ok(())
    }

    async fn get_metrics(&self, use_case_id: &str) -> ApiResult<Option<Metrics>> {
        Ok(LocalStore::get_metrics(self, use_case_id)?)
    }

    async fn update_metrics(&self, use_case_id: &str, metrics: Metrics) -> ApiResult<Metrics> {
        Ok(LocalStore::update_metrics(self, use_case_id, metrics)?)
    }

    async fn get_roi(&self, use_case_id: &str) -> ApiResult<Option<RoiResults>> {
        Ok(LocalStore::get_roi(self, use_case_id)?)
    }

    async fn get_readiness(&self, use_case_id: &str) -> ApiResult<Readiness> {
        Ok(LocalStore::get_readiness(self, use_case_id)?)
    }

    async fn export_use_case(&self, id: &str) -> ApiResult<UseCasePack> {
        Ok(LocalStore::export_use_case(self, id)?)
    }

    async fn import_use_case(&self, pack: UseCasePack, owner_id: &str) -> ApiResult<UseCase> {
        Ok(LocalStore::import_use_case(self, pack, owner_id)?)
    }
}
