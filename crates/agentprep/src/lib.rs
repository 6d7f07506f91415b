pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod process;
pub mod sanitize;
pub mod scoring;
pub mod store;

pub use api::{open_api, AgentPrepApi, ApiError, ApiResult, ApiResultExt, ErrorKind, FallbackApi, RemoteApi};
pub use config::{load_config, load_config_from_str, Config};
pub use error::{AgentPrepError, ConfigError, Result};
pub use logging::init_logging;
pub use model::{CatalogEntity, EntityKind, UseCase, UseCasePack, UseCaseRecord};
pub use scoring::{completion_ratio, compute_readiness, compute_roi, CatalogSnapshot};
pub use store::{LocalStore, MemoryBackend, SqliteBackend, StorageBackend, StoreError};
