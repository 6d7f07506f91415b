//! Remote-first dispatch with the local store as fallback.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agentprep::api::{ApiError, ErrorKind};
use agentprep::model::{Application, ApplicationType, Connector, ConnectorType, ProcessStep, StepType};
use agentprep::{AgentPrepApi, ApiResultExt, FallbackApi, LocalStore, RemoteApi, UseCase};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use common::{populate_catalog, ScriptedApi};

fn unreachable_remote() -> RemoteApi {
    RemoteApi::with_timeouts(
        "http://127.0.0.1:1/api/use-cases",
        Duration::from_millis(500),
        Duration::from_secs(2),
    )
    .unwrap()
}

/// Loopback HTTP server answering every request with one canned response.
struct StubServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
}

impl StubServer {
    async fn start(status: &'static str, content_type: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        status,
                        content_type,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self {
            base_url: format!("http://{}/api/use-cases", addr),
            hits,
        }
    }

    fn remote(&self) -> RemoteApi {
        RemoteApi::with_timeouts(&self.base_url, Duration::from_secs(2), Duration::from_secs(5))
            .unwrap()
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn seeded_store(name: &str) -> (LocalStore, UseCase) {
    let store = LocalStore::in_memory();
    let uc = store.create_use_case(UseCase::new("U1", name)).unwrap();
    (store, uc)
}

#[tokio::test]
async fn test_without_primary_answers_locally() {
    let api: FallbackApi<RemoteApi, LocalStore> = FallbackApi::fallback_only(LocalStore::in_memory());

    let created = api
        .create_use_case(UseCase::new("U1", "Local only"))
        .await
        .unwrap();
    let fetched = api.get_use_case(&created.id).await.unwrap();
    assert_eq!(fetched.name, "Local only");
    assert!(api.primary().is_none());
}

#[tokio::test]
async fn test_network_failure_falls_back_once() {
    let api = FallbackApi::new(Some(ScriptedApi::network_down()), LocalStore::in_memory());

    let created = api
        .create_use_case(UseCase::new("U1", "Offline draft"))
        .await
        .unwrap();
    assert_eq!(api.primary().unwrap().calls(), 1);

    let listed = api.list_use_cases("U1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(api.primary().unwrap().calls(), 2);

    // Written to the fallback store, not lost.
    assert_eq!(api.fallback().get_use_case(&created.id).unwrap().name, "Offline draft");
}

#[tokio::test]
async fn test_every_fallback_kind_reaches_local_store() {
    let failures: [fn() -> ApiError; 5] = [
        || ApiError::Network("reset".into()),
        || ApiError::NotFound("use case 'x'".into()),
        || ApiError::Rejected {
            status: 403,
            message: "forbidden".into(),
        },
        || ApiError::ServerFailure {
            status: 503,
            message: "unavailable".into(),
        },
        || ApiError::MalformedResponse("expected object".into()),
    ];

    for make_error in failures {
        let store = LocalStore::in_memory();
        let uc = store.create_use_case(UseCase::new("U1", "Kept")).unwrap();
        let api = FallbackApi::new(Some(ScriptedApi::failing_with(make_error)), store);

        let fetched = api.get_use_case(&uc.id).await.unwrap();
        assert_eq!(fetched.id, uc.id, "fallback skipped for {}", make_error().kind());
    }
}

#[tokio::test]
async fn test_validation_error_does_not_fall_back() {
    let store = LocalStore::in_memory();
    let uc = store.create_use_case(UseCase::new("U1", "Untouched")).unwrap();
    let api = FallbackApi::new(
        Some(ScriptedApi::failing_with(|| {
            ApiError::Validation("name is required".into())
        })),
        store,
    );

    let err = api
        .update_use_case(&uc.id, &json!({ "name": "Changed" }))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(api.primary().unwrap().calls(), 1);
    assert_eq!(api.fallback().get_use_case(&uc.id).unwrap().name, "Untouched");
}

#[tokio::test]
async fn test_successful_primary_leaves_fallback_untouched() {
    let primary = LocalStore::in_memory();
    let api = FallbackApi::new(Some(primary), LocalStore::in_memory());

    let created = api
        .create_use_case(UseCase::new("U1", "Remote copy"))
        .await
        .unwrap();
    assert_eq!(
        api.primary().unwrap().get_use_case(&created.id).unwrap().name,
        "Remote copy"
    );
    assert!(api.fallback().list_use_cases("U1").is_empty());
}

#[tokio::test]
async fn test_fallback_error_is_final() {
    let api = FallbackApi::new(Some(ScriptedApi::network_down()), LocalStore::in_memory());

    let err = api.get_use_case("ghost").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(api.get_use_case("ghost").await.found().unwrap().is_none());
    assert_eq!(api.primary().unwrap().calls(), 2);
}

#[tokio::test]
async fn test_unreachable_remote_falls_back_to_store() {
    let store = LocalStore::in_memory();
    let (uc, _) = populate_catalog(&store, "U1");
    let api = FallbackApi::new(Some(unreachable_remote()), store);

    let readiness = api.get_readiness(&uc.id).await.unwrap();
    assert_eq!(readiness.overall_score, 5.0);

    let roi = api.get_roi(&uc.id).await.unwrap().unwrap();
    assert!((roi.annual_savings_usd - 1_228_700.0).abs() < 0.005);

    let pack = api.export_use_case(&uc.id).await.unwrap();
    let imported = api.import_use_case(pack, "U2").await.unwrap();
    assert_eq!(imported.owner_id, "U2");
    assert_eq!(api.list_use_cases("U2").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_catalog_operations_through_dispatcher() {
    let api = FallbackApi::new(Some(ScriptedApi::network_down()), LocalStore::in_memory());
    let uc = api
        .create_use_case(UseCase::new("U1", "Catalog"))
        .await
        .unwrap();

    let root = api
        .create(&uc.id, ProcessStep::new("Start", StepType::Trigger))
        .await
        .unwrap();
    api.create(&uc.id, ProcessStep::new("Next", StepType::Task).child_of(&root))
        .await
        .unwrap();
    let app = api
        .create(&uc.id, Application::new("CRM", ApplicationType::Saas))
        .await
        .unwrap();
    api.create(&uc.id, Connector::new(app.id.clone(), "Accounts", ConnectorType::Http))
        .await
        .unwrap();

    let renamed: ProcessStep = api
        .update(&uc.id, &root.id, &json!({ "title": "Receive" }))
        .await
        .unwrap();
    assert_eq!(renamed.title, "Receive");

    api.delete::<ProcessStep>(&uc.id, &root.id).await.unwrap();
    assert!(api.list::<ProcessStep>(&uc.id).await.unwrap().is_empty());

    api.delete::<Application>(&uc.id, &app.id).await.unwrap();
    assert!(api.list::<Connector>(&uc.id).await.unwrap().is_empty());

    let err = api
        .get::<Application>(&uc.id, &app.id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_metrics_through_dispatcher() {
    let api = FallbackApi::new(Some(ScriptedApi::network_down()), LocalStore::in_memory());
    let uc = api
        .create_use_case(UseCase::new("U1", "Metrics"))
        .await
        .unwrap();

    assert!(api.get_metrics(&uc.id).await.unwrap().is_none());
    assert!(api.get_roi(&uc.id).await.unwrap().is_none());

    let saved = api
        .update_metrics(&uc.id, common::reference_metrics())
        .await
        .unwrap();
    assert_eq!(saved.use_case_id, uc.id);
    assert!(api.get_roi(&uc.id).await.unwrap().is_some());

    api.delete_use_case(&uc.id).await.unwrap();
    assert!(api.get_metrics(&uc.id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_html_success_page_is_malformed_and_falls_back() {
    let server = StubServer::start(
        "200 OK",
        "text/html",
        "<html><body>Sign in to continue</body></html>",
    )
    .await;

    let err = server.remote().get_use_case("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);

    let (store, uc) = seeded_store("Local copy");
    let api = FallbackApi::new(Some(server.remote()), store);
    let fetched = api.get_use_case(&uc.id).await.unwrap();
    assert_eq!(fetched.name, "Local copy");
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_remote_not_found_falls_back() {
    let server = StubServer::start(
        "404 Not Found",
        "application/json",
        r#"{"error":"use case not found"}"#,
    )
    .await;

    let (store, uc) = seeded_store("Only local");
    let api = FallbackApi::new(Some(server.remote()), store);
    let fetched = api.get_use_case(&uc.id).await.unwrap();
    assert_eq!(fetched.id, uc.id);
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_remote_unprocessable_is_surfaced() {
    let server = StubServer::start(
        "422 Unprocessable Entity",
        "application/json",
        r#"{"error":"id is malformed"}"#,
    )
    .await;

    let (store, uc) = seeded_store("Present locally");
    let api = FallbackApi::new(Some(server.remote()), store);
    let err = api.get_use_case(&uc.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("id is malformed"));
    assert_eq!(server.hits(), 1);
}
