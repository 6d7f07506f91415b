//! REST client for the use-case API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info_span, Instrument};

use super::{classify_status, AgentPrepApi, ApiError, ApiResult};
use crate::config::RemoteConfig;
use crate::model::{
    CatalogEntity, EntityKind, Metrics, Readiness, RoiResults, UseCase, UseCasePack,
};
use crate::sanitize::{redact_url, truncate_body};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct ImportRequest<'a> {
    pack: &'a UseCasePack,
    owner_id: &'a str,
}

/// Talks to `{base_url}/...` over HTTP with JSON bodies.
#[derive(Clone)]
pub struct RemoteApi {
    client: Client,
    base_url: String,
}

impl RemoteApi {
    /// Creates a client with the default timeouts.
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> ApiResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &RemoteConfig) -> ApiResult<Self> {
        Self::with_timeouts(
            config.base_url.clone(),
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins path segments onto the base URL.
    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments.iter().filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// Sends `request` and returns the body of a successful response.
    async fn execute(
        &self,
        request: RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> ApiResult<String> {
        let span = info_span!("remote.request", method, url = %redact_url(url));
        async move {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            debug!(status = status.as_u16(), "Remote response received");

            if status.is_success() {
                Ok(body)
            } else {
                Err(classify_status(status.as_u16(), &body))
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        method: &'static str,
        url: &str,
    ) -> ApiResult<T> {
        let body = self.execute(request, method, url).await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::MalformedResponse(format!(
                "{} {}: {} (body: {})",
                method,
                redact_url(url),
                e,
                truncate_body(&body)
            ))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> ApiResult<T> {
        self.fetch(self.client.get(&url), "GET", &url).await
    }

    async fn post_json<B, T>(&self, url: String, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.client.post(&url).json(body), "POST", &url).await
    }

    async fn put_json<B, T>(&self, url: String, body: &B) -> ApiResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch(self.client.put(&url).json(body), "PUT", &url).await
    }
}

#[async_trait]
impl AgentPrepApi for RemoteApi {
    async fn create_use_case(&self, use_case: UseCase) -> ApiResult<UseCase> {
        self.post_json(self.url(&[]), &use_case).await
    }

    async fn get_use_case(&self, id: &str) -> ApiResult<UseCase> {
        self.get_json(self.url(&[id])).await
    }

    async fn update_use_case(&self, id: &str, patch: &Value) -> ApiResult<UseCase> {
        self.put_json(self.url(&[id]), patch).await
    }

    async fn list_use_cases(&self, owner_id: &str) -> ApiResult<Vec<UseCase>> {
        let url = self.url(&[]);
        let request = self.client.get(&url).query(&[("owner_id", owner_id)]);
        self.fetch(request, "GET", &url).await
    }

    async fn delete_use_case(&self, id: &str) -> ApiResult<()> {
        let url = self.url(&[id]);
        self.execute(self.client.delete(&url), "DELETE", &url)
            .await
            .map(|_| ())
    }

    async fn list<E: CatalogEntity>(&self, use_case_id: &str) -> ApiResult<Vec<E>> {
        self.get_json(self.url(&[use_case_id, E::KIND.path_segment()]))
            .await
    }

    async fn get<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<E> {
        self.get_json(self.url(&[use_case_id, E::KIND.path_segment(), id]))
            .await
    }

    async fn create<E: CatalogEntity>(&self, use_case_id: &str, entity: E) -> ApiResult<E> {
        self.post_json(self.url(&[use_case_id, E::KIND.path_segment()]), &entity)
            .await
    }

    async fn update<E: CatalogEntity>(
        &self,
        use_case_id: &str,
        id: &str,
        patch: &Value,
    ) -> ApiResult<E> {
        self.put_json(self.url(&[use_case_id, E::KIND.path_segment(), id]), patch)
            .await
    }

    async fn delete<E: CatalogEntity>(&self, use_case_id: &str, id: &str) -> ApiResult<()> {
        let url = self.url(&[use_case_id, E::KIND.path_segment()]);
        let mut body = Map::new();
        body.insert(E::KIND.id_field().to_string(), Value::from(id));
        self.execute(self.client.delete(&url).json(&body), "DELETE", &url)
            .await
            .map(|_| ())
    }

    async fn get_metrics(&self, use_case_id: &str) -> ApiResult<Option<Metrics>> {
        self.get_json(self.url(&[use_case_id, EntityKind::Metrics.path_segment()]))
            .await
    }

    async fn update_metrics(&self, use_case_id: &str, metrics: Metrics) -> ApiResult<Metrics> {
        self.put_json(
            self.url(&[use_case_id, EntityKind::Metrics.path_segment()]),
            &metrics,
        )
        .await
    }

    async fn get_roi(&self, use_case_id: &str) -> ApiResult<Option<RoiResults>> {
        self.get_json(self.url(&[use_case_id, "roi"])).await
    }

    async fn get_readiness(&self, use_case_id: &str) -> ApiResult<Readiness> {
        self.get_json(self.url(&[use_case_id, "readiness"])).await
    }

    async fn export_use_case(&self, id: &str) -> ApiResult<UseCasePack> {
        self.get_json(self.url(&[id, "export"])).await
    }

    async fn import_use_case(&self, pack: UseCasePack, owner_id: &str) -> ApiResult<UseCase> {
        let body = ImportRequest {
            pack: &pack,
            owner_id,
        };
        self.post_json(self.url(&["import"]), &body).await
    }
}
