//! Remote-first dispatcher with a local fallback.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::{AgentPrepApi, ApiFuture, ApiResult};
use crate::model::{CatalogEntity, Metrics, Readiness, RoiResults, UseCase, UseCasePack};

/// Tries `primary` first (when configured) and answers from `fallback` when
/// the primary fails with an error whose kind allows it.
///
/// The fallback runs at most once per call and its outcome is final. Errors
/// that do not trigger fallback (validation, storage) are returned as-is.
pub struct FallbackApi<P, F> {
    primary: Option<P>,
    fallback: F,
}

impl<P, F> FallbackApi<P, F>
where
    P: AgentPrepApi,
    F: AgentPrepApi,
{
    pub fn new(primary: Option<P>, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// A dispatcher that always uses `fallback`.
    pub fn fallback_only(fallback: F) -> Self {
        Self::new(None, fallback)
    }

    pub fn primary(&self) -> Option<&P> {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> &F {
        &self.fallback
    }

    async fn dispatch<T: Send>(
        &self,
        operation: &'static str,
        primary: Option<ApiFuture<'_, T>>,
        fallback: ApiFuture<'_, T>,
    ) -> ApiResult<T> {
        let Some(primary) = primary else {
            return fallback.await;
        };

        match primary.await {
            Err(err) if err.triggers_fallback() => {
                warn!(
                    operation,
                    kind = %err.kind(),
                    error = %err,
                    "Remote call failed, answering from local store"
                );
                fallback.await
            }
            result => result,
        }
    }
}

#[async_trait]
impl<P, F> AgentPrepApi for FallbackApi<P, F>
where
    P: AgentPrepApi,
    F: AgentPrepApi,
{
    async fn create_use_case(&self, use_case: UseCase) -> ApiResult<UseCase> {
        let primary = self
            .primary
            .as_ref()
            .map(|p| p.create_use_case(use_case.clone()));
        self.dispatch(
            "create_use_case",
            primary,
            self.fallback.create_use_case(use_case),
        )
        .await
    }

    async fn get_use_case(&self, id: &str) -> ApiResult<UseCase> {
        let primary = self.primary.as_ref().map(|p| p.get_use_case(id));
        self.dispatch("get_use_case", primary, self.fallback.get_use_case(id))
            .await
    }

    async fn update_use_case(&self, id: &str, patch: &Value) -> ApiResult<UseCase> {
        let primary = self.primary.as_ref().map(|p| p.update_use_case(id, patch));
        self.dispatch(
            "update_use_case",
            primary,
            self.fallback.update_use_case(id, patch),
        )
        .await
    }

    async fn list_use_cases(&self, owner_id: &str) -> ApiResult<Vec<UseCase>> {
        let primary = self.primary.as_ref().map(|p| p.list_use_cases(owner_id));
        self.dispatch(
            "list_use_cases",
            primary,
            self.fallback.list_use_cases(owner_id),
        )
        .await
    }

    async fn delete_use_case(&self, id: &str) -> ApiResult<()> {
        let primary = self.primary.as_ref().map(|p| p.delete_use_case(id));
        self.dispatch("delete_use_case", primary, self.fallback.delete_use_case(id))
            .await
    }

    async fn list<E: CatalogEntity>(&self, use_case_id: &str) -> ApiResult<Vec<E>> {
        let primary = self.primary.as_ref().map(|p| p.list::<E>(use_case_id));
        self.dispatch("list", primary, self.fallback.list::<E>(use_case_id))
            .await
    }

    async fn get<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<E> {
        let primary = self.primary.as_ref().map(|p| p.get::<E>(use_case_id, id));
        self.dispatch("get", primary, self.fallback.get::<E>(use_case_id, id))
            .await
    }

    async fn create<E: CatalogEntity>(&self, use_case_id: &str, entity: E) -> ApiResult<E> {
        let primary = self
            .primary
            .as_ref()
            .map(|p| p.create::<E>(use_case_id, entity.clone()));
        self.dispatch(
            "create",
            primary,
            self.fallback.create::<E>(use_case_id, entity),
        )
        .await
    }

    async fn update<E: CatalogEntity>(
        &self,
        use_case_id: &str,
        id: &str,
        patch: &Value,
    ) -> ApiResult<E> {
        let primary = self
            .primary
            .as_ref()
            .map(|p| p.update::<E>(use_case_id, id, patch));
        self.dispatch(
            "update",
            primary,
            self.fallback.update::<E>(use_case_id, id, patch),
        )
        .await
    }

    async fn delete<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<()> {
        let primary = self.primary.as_ref().map(|p| p.delete::<E>(use_case_id, id));
        self.dispatch("delete", primary, self.fallback.delete::<E>(use_case_id, id))
            .await
    }

    async fn get_metrics(&self, use_case_id: &str) -> ApiResult<Option<Metrics>> {
        let primary = self.primary.as_ref().map(|p| p.get_metrics(use_case_id));
        self.dispatch("get_metrics", primary, self.fallback.get_metrics(use_case_id))
            .await
    }

    async fn update_metrics(&self, use_case_id: &str, metrics: Metrics) -> ApiResult<Metrics> {
        let primary = self
            .primary
            .as_ref()
            .map(|p| p.update_metrics(use_case_id, metrics.clone()));
        self.dispatch(
            "update_metrics",
            primary,
            self.fallback.update_metrics(use_case_id, metrics),
        )
        .await
    }

    async fn get_roi(&self, use_case_id: &str) -> ApiResult<Option<RoiResults>> {
        let primary = self.primary.as_ref().map(|p| p.get_roi(use_case_id));
        self.dispatch("get_roi", primary, self.fallback.get_roi(use_case_id))
            .await
    }

    async fn get_readiness(&self, use_case_id: &str) -> ApiResult<Readiness> {
        let primary = self.primary.as_ref().map(|p| p.get_readiness(use_case_id));
        self.dispatch(
            "get_readiness",
            primary,
            self.fallback.get_readiness(use_case_id),
        )
        .await
    }

    async fn export_use_case(&self, id: &str) -> ApiResult<UseCasePack> {
        let primary = self.primary.as_ref().map(|p| p.export_use_case(id));
        self.dispatch("export_use_case", primary, self.fallback.export_use_case(id))
            .await
    }

    async fn import_use_case(&self, pack: UseCasePack, owner_id: &str) -> ApiResult<UseCase> {
        let primary = self
            .primary
            .as_ref()
            .map(|p| p.import_use_case(pack.clone(), owner_id));
        self.dispatch(
            "import_use_case",
            primary,
            self.fallback.import_use_case(pack, owner_id),
        )
        .await
    }
}
