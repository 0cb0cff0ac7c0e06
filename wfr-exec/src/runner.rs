use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use wfr_core::{KnowledgeGraphMerger, Query};

use crate::catalog::{OperationCatalog, OperationTable};
use crate::config::RunnerConfig;
use crate::engine::{Engine, RunError, RunOutcome};
use crate::http::HttpClient;
use crate::registry::{RegistryClient, ServiceTable};
use crate::store::{CatalogStore, RefreshReport};

/// The runner as a service: shared tables plus the engine that runs against them.
pub struct Runner {
    store: CatalogStore,
    engine: Engine,
    refresh_interval: Option<Duration>,
}

impl Runner {
    pub fn new(store: CatalogStore, engine: Engine) -> Self {
        Self {
            store,
            engine,
            refresh_interval: None,
        }
    }

    /// A runner backed by the configured registry and operation schema. The tables start
    /// empty; call [`Runner::refresh`] before serving requests.
    pub fn from_config(config: &RunnerConfig, http: Arc<dyn HttpClient>) -> Self {
        let registry = RegistryClient::new(http.clone(), config.registry.clone());
        let catalog = OperationCatalog::new(http.clone(), config.catalog.clone());
        let engine = Engine::new(http, Arc::new(KnowledgeGraphMerger), config.engine.clone());
        Self {
            store: CatalogStore::new(registry, catalog),
            engine,
            refresh_interval: config.refresh_interval,
        }
    }

    pub async fn run(&self, query: Query) -> Result<RunOutcome, RunError> {
        let snapshot = self.store.snapshot();
        self.engine.run(&snapshot, query).await
    }

    pub fn services(&self) -> Arc<ServiceTable> {
        self.store.services()
    }

    pub fn operations(&self) -> Arc<OperationTable> {
        self.store.operations()
    }

    pub async fn refresh(&self) -> RefreshReport {
        self.store.refresh().await
    }

    /// Start periodic refreshes when a refresh interval is configured.
    pub fn spawn_refresh(&self) -> Option<JoinHandle<()>> {
        self.store.spawn_refresh_loop(self.refresh_interval?)
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }
}
