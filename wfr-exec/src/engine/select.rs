use std::sync::Arc;

use wfr_core::Operation;

use crate::registry::{Provider, ServiceTable};

/// Which providers a step may use. Empty lists count as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFilter<'a> {
    Allow(&'a [String]),
    Deny(&'a [String]),
    Any,
}

impl<'a> ProviderFilter<'a> {
    pub fn of(op: &'a Operation) -> Self {
        if let Some(list) = op.allowlist().filter(|l| !l.is_empty()) {
            return ProviderFilter::Allow(list);
        }
        if let Some(list) = op.denylist().filter(|l| !l.is_empty()) {
            return ProviderFilter::Deny(list);
        }
        ProviderFilter::Any
    }

    pub fn admits(&self, provider: &Provider) -> bool {
        match self {
            ProviderFilter::Allow(list) => list.contains(&provider.infores),
            ProviderFilter::Deny(list) => !list.contains(&provider.infores),
            ProviderFilter::Any => true,
        }
    }
}

/// Candidates for one step, in registry order.
pub fn select_providers(services: &ServiceTable, op: &Operation) -> Vec<Arc<Provider>> {
    let filter = ProviderFilter::of(op);
    services
        .providers_for(&op.id)
        .iter()
        .filter(|p| filter.admits(p))
        .cloned()
        .collect()
}
