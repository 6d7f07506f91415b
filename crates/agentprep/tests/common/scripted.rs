//! A primary API double that fails every call with a chosen error.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use agentprep::api::{AgentPrepApi, ApiError, ApiResult};
use agentprep::model::{
    CatalogEntity, Metrics, Readiness, RoiResults, UseCase, UseCasePack,
};
use async_trait::async_trait;
use serde_json::Value;

pub struct ScriptedApi {
    make_error: fn() -> ApiError,
    calls: AtomicUsize,
}

impl ScriptedApi {
    pub fn failing_with(make_error: fn() -> ApiError) -> Self {
        Self {
            make_error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn network_down() -> Self {
        Self::failing_with(|| ApiError::Network("connection refused".to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail<T>(&self) -> ApiResult<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}

#[async_trait]
impl AgentPrepApi for ScriptedApi {
    async fn create_use_case(&self, _use_case: UseCase) -> ApiResult<UseCase> {
        self.fail()
    }

    async fn get_use_case(&self, _id: &str) -> ApiResult<UseCase> {
        self.fail()
    }

    async fn update_use_case(&self, _id: &str, _patch: &Value) -> ApiResult<UseCase> {
        self.fail()
    }

    async fn list_use_cases(&self, _owner_id: &str) -> ApiResult<Vec<UseCase>> {
        self.fail()
    }

    async fn delete_use_case(&self, _id: &str) -> ApiResult<()> {
        self.fail()
    }

    async fn list<E: CatalogEntity>(&self, _use_case_id: &str) -> ApiResult<Vec<E>> {
        self.fail()
    }

    async fn get<E: CatalogEntity>(&self, _use_case_id: &str, _id: &str) -> ApiResult<E> {
        self.fail()
    }

    async fn create<E: CatalogEntity>(&self, _use_case_id: &str, _entity: E) -> ApiResult<E> {
        self.fail()
    }

    async fn update<E: CatalogEntity>(
        &self,
        _use_case_id: &str,
        _id: &str,
        _patch: &Value,
    ) -> ApiResult<E> {
        self.fail()
    }

    async fn delete<E: CatalogEntity>(&self, _use_case_id: &str, _id: &str) -> ApiResult<()> {
        self.fail()
    }

    async fn get_metrics(&self, _use_case_id: &str) -> ApiResult<Option<Metrics>> {
        self.fail()
    }

    async fn update_metrics(&self, _use_case_id: &str, _metrics: Metrics) -> ApiResult<Metrics> {
        self.fail()
    }

    async fn get_roi(&self, _use_case_id: &str) -> ApiResult<Option<RoiResults>> {
        self.fail()
    }

    async fn get_readiness(&self, _use_case_id: &str) -> ApiResult<Readiness> {
        self.fail()
    }

    async fn export_use_case(&self, _id: &str) -> ApiResult<UseCasePack> {
        self.fail()
    }

    async fn import_use_case(&self, _pack: UseCasePack, _owner_id: &str) -> ApiResult<UseCase> {
        self.fail()
    }
}
