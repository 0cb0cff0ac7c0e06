#![forbid(unsafe_code)]

//! Runtime for the workflow runner: provider discovery, the operation catalog, the
//! swappable tables they populate, and the engine that dispatches workflow steps.

pub mod base_url;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod http;
pub mod registry;
pub mod runner;
pub mod store;

pub use crate::base_url::{BaseUrl, BaseUrlError};
pub use crate::catalog::{CatalogError, OperationCatalog, OperationKind, OperationTable};
pub use crate::config::{CatalogConfig, EngineConfig, NormalizerConfig, RegistryConfig, RunnerConfig};
pub use crate::engine::{CallFailure, CallOutcome, Engine, RunError, RunOutcome, RunStatus};
pub use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};
pub use crate::registry::{HitRejection, Provider, RegistryClient, RegistryError, ServiceTable};
pub use crate::runner::Runner;
pub use crate::store::{CatalogStore, RefreshReport, Snapshot, TableRefresh};
