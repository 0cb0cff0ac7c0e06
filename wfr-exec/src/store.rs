// Process-wide registry and operation tables with atomic replacement.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tracing::{info, warn};

use crate::catalog::{OperationCatalog, OperationTable};
use crate::registry::{RegistryClient, ServiceTable};

/// The tables one workflow request runs against.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub services: Arc<ServiceTable>,
    pub operations: Arc<OperationTable>,
}

impl Snapshot {
    pub fn new(services: ServiceTable, operations: OperationTable) -> Self {
        Self {
            services: Arc::new(services),
            operations: Arc::new(operations),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableRefresh {
    /// The table was rebuilt and swapped in.
    Replaced { entries: usize },
    /// The fetch failed; the previous table is still served.
    Kept { error: String },
    /// No source is configured for this table.
    Static,
}

impl TableRefresh {
    pub fn is_replaced(&self) -> bool {
        matches!(self, TableRefresh::Replaced { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RefreshReport {
    pub services: TableRefresh,
    pub operations: TableRefresh,
}

#[derive(Clone)]
struct Sources {
    registry: RegistryClient,
    catalog: OperationCatalog,
}

/// Holds the current service and operation tables.
///
/// Both tables live behind one pointer, so a [`Snapshot`] is always a pair that was
/// current at the same instant. Readers keep it for the whole request. A refresh builds
/// new tables off to the side and swaps in, in a single store, each table whose fetch
/// succeeded.
#[derive(Clone)]
pub struct CatalogStore {
    tables: Arc<ArcSwap<Snapshot>>,
    sources: Option<Sources>,
}

impl CatalogStore {
    /// A store that is populated from the registry and the operation schema.
    pub fn new(registry: RegistryClient, catalog: OperationCatalog) -> Self {
        Self {
            tables: Arc::new(ArcSwap::from_pointee(Snapshot::new(
                ServiceTable::default(),
                OperationTable::default(),
            ))),
            sources: Some(Sources { registry, catalog }),
        }
    }

    /// A store with fixed tables; `refresh` leaves them alone.
    pub fn with_tables(services: ServiceTable, operations: OperationTable) -> Self {
        Self {
            tables: Arc::new(ArcSwap::from_pointee(Snapshot::new(services, operations))),
            sources: None,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::clone(&self.tables.load())
    }

    pub fn services(&self) -> Arc<ServiceTable> {
        self.tables.load().services.clone()
    }

    pub fn operations(&self) -> Arc<OperationTable> {
        self.tables.load().operations.clone()
    }

    pub fn replace_services(&self, table: ServiceTable) {
        self.swap(Some(Arc::new(table)), None);
    }

    pub fn replace_operations(&self, table: OperationTable) {
        self.swap(None, Some(Arc::new(table)));
    }

    fn swap(&self, services: Option<Arc<ServiceTable>>, operations: Option<Arc<OperationTable>>) {
        self.tables.rcu(|current| Snapshot {
            services: services.clone().unwrap_or_else(|| current.services.clone()),
            operations: operations.clone().unwrap_or_else(|| current.operations.clone()),
        });
    }

    /// Re-fetch both tables. Each one is replaced only if its own fetch succeeded.
    pub async fn refresh(&self) -> RefreshReport {
        let Some(sources) = &self.sources else {
            return RefreshReport {
                services: TableRefresh::Static,
                operations: TableRefresh::Static,
            };
        };

        let (services, operations) =
            tokio::join!(sources.registry.fetch(), sources.catalog.fetch());

        let (services, services_report) = match services {
            Ok(table) => {
                let entries = table.len();
                (Some(Arc::new(table)), TableRefresh::Replaced { entries })
            }
            Err(e) => {
                warn!(error = %e, "registry refresh failed; keeping previous services");
                (
                    None,
                    TableRefresh::Kept {
                        error: e.to_string(),
                    },
                )
            }
        };
        let (operations, operations_report) = match operations {
            Ok(table) => {
                let entries = table.len();
                (Some(Arc::new(table)), TableRefresh::Replaced { entries })
            }
            Err(e) => {
                warn!(error = %e, "operation catalog refresh failed; keeping previous operations");
                (
                    None,
                    TableRefresh::Kept {
                        error: e.to_string(),
                    },
                )
            }
        };
        if services.is_some() || operations.is_some() {
            self.swap(services, operations);
        }

        RefreshReport {
            services: services_report,
            operations: operations_report,
        }
    }

    /// Refresh on a fixed period. Returns `None` for a store without sources.
    pub fn spawn_refresh_loop(&self, interval: Duration) -> Option<tokio::task::JoinHandle<()>> {
        self.sources.as_ref()?;
        let store = self.clone();
        Some(tokio::spawn(async move {
            info!(?interval, "starting registry refresh loop");
            loop {
                tokio::time::sleep(interval).await;
                let report = store.refresh().await;
                info!(
                    services = report.services.is_replaced(),
                    operations = report.operations.is_replaced(),
                    "periodic refresh finished"
                );
            }
        }))
    }
}
