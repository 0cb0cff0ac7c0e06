use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use url::Url;
use wfr_core::OperationId;

use crate::base_url::BaseUrl;

/// A registered provider that passed URL, maturity, version, and reachability checks.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Provider {
    pub infores: String,
    pub title: String,
    pub base_url: BaseUrl,
    pub maturity: String,
    pub version: String,
    pub operations: BTreeSet<OperationId>,
}

impl Provider {
    pub fn query_url(&self) -> Url {
        self.base_url.endpoint("query")
    }
}

/// Operation id to the providers advertising it, in discovery order.
///
/// Built once per refresh and never edited afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct ServiceTable {
    by_operation: BTreeMap<OperationId, Vec<Arc<Provider>>>,
}

impl ServiceTable {
    pub fn from_providers(providers: impl IntoIterator<Item = Provider>) -> Self {
        let mut by_operation: BTreeMap<OperationId, Vec<Arc<Provider>>> = BTreeMap::new();
        for provider in providers {
            let provider = Arc::new(provider);
            for op in &provider.operations {
                by_operation
                    .entry(op.clone())
                    .or_default()
                    .push(Arc::clone(&provider));
            }
        }
        Self { by_operation }
    }

    pub fn providers_for(&self, op: &OperationId) -> &[Arc<Provider>] {
        self.by_operation.get(op).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OperationId, &[Arc<Provider>])> {
        self.by_operation.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of operation kinds with at least one provider.
    pub fn len(&self) -> usize {
        self.by_operation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_operation.is_empty()
    }

    /// Number of distinct providers across all operations.
    pub fn provider_count(&self) -> usize {
        self.by_operation
            .values()
            .flatten()
            .map(|p| p.infores.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}
