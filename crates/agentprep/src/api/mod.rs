//! One interface over the remote REST API and the local store.
//!
//! [`RemoteApi`] and [`LocalStore`] both implement [`AgentPrepApi`];
//! [`FallbackApi`] composes them, answering from the local store whenever the
//! remote call fails in a way that [`ErrorKind::triggers_fallback`] allows.

mod error;
mod fallback;
mod local;
mod remote;

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value;

pub use error::{classify_status, ApiError, ErrorKind};
pub use fallback::FallbackApi;
pub use remote::RemoteApi;

use crate::config::Config;
use crate::error::AgentPrepError;
use crate::model::{CatalogEntity, Metrics, Readiness, RoiResults, UseCase, UseCasePack};
use crate::store::LocalStore;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// The boxed future every [`AgentPrepApi`] method returns.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = ApiResult<T>> + Send + 'a>>;

/// Data operations on use cases and their catalogs.
///
/// Patches are JSON objects merged key-by-key onto the stored record;
/// identity fields are never overwritten.
#[async_trait]
pub trait AgentPrepApi: Send + Sync {
    async fn create_use_case(&self, use_case: UseCase) -> ApiResult<UseCase>;

    async fn get_use_case(&self, id: &str) -> ApiResult<UseCase>;

    async fn update_use_case(&self, id: &str, patch: &Value) -> ApiResult<UseCase>;

    /// Use cases owned by `owner_id`, most recently touched first.
    async fn list_use_cases(&self, owner_id: &str) -> ApiResult<Vec<UseCase>>;

    async fn delete_use_case(&self, id: &str) -> ApiResult<()>;

    async fn list<E: CatalogEntity>(&self, use_case_id: &str) -> ApiResult<Vec<E>>;

    async fn get<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<E>;

    /// Stores `entity` under a newly generated id and returns the stored copy.
    async fn create<E: CatalogEntity>(&self, use_case_id: &str, entity: E) -> ApiResult<E>;

    async fn update<E: CatalogEntity>(
        &self,
        use_case_id: &str,
        id: &str,
        patch: &Value,
    ) -> ApiResult<E>;

    /// Deletes the entity along with its dependents (child steps, connectors).
    async fn delete<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<()>;

    async fn get_metrics(&self, use_case_id: &str) -> ApiResult<Option<Metrics>>;

    async fn update_metrics(&self, use_case_id: &str, metrics: Metrics) -> ApiResult<Metrics>;

    /// `None` while the metrics are insufficient for a projection.
    async fn get_roi(&self, use_case_id: &str) -> ApiResult<Option<RoiResults>>;

    async fn get_readiness(&self, use_case_id: &str) -> ApiResult<Readiness>;

    async fn export_use_case(&self, id: &str) -> ApiResult<UseCasePack>;

    /// Recreates `pack` as a new use case owned by `owner_id`.
    async fn import_use_case(&self, pack: UseCasePack, owner_id: &str) -> ApiResult<UseCase>;
}

/// Read-path helper: treats a not-found error as absence.
pub trait ApiResultExt<T> {
    fn found(self) -> ApiResult<Option<T>>;
}

impl<T> ApiResultExt<T> for ApiResult<T> {
    fn found(self) -> ApiResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Builds the dispatcher described by `config`: the remote API first when
/// enabled, the local store always.
pub fn open_api(config: &Config) -> Result<FallbackApi<RemoteApi, LocalStore>, AgentPrepError> {
    let local = LocalStore::from_config(&config.store)?;
    let remote = if config.remote.enabled {
        Some(RemoteApi::from_config(&config.remote)?)
    } else {
        tracing::info!("Remote API disabled, using local store only");
        None
    };
    Ok(FallbackApi::new(remote, local))
}
