use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::base_url::BaseUrl;
use crate::config::RegistryConfig;
use crate::http::{HttpClient, HttpError, HttpRequest};
use crate::registry::error::{HitRejection, RegistryError};
use crate::registry::hit::{RegistryHit, RegistryPage};
use crate::registry::provider::{Provider, ServiceTable};

/// Probe responses are discarded; this only bounds how much we read.
const PROBE_MAX_BYTES: usize = 256 * 1024;

/// Only the parts of a registry entry that admission reads.
const SEARCH_FIELDS: &str = "servers,info,_meta";

/// Discovers providers from the external registry.
#[derive(Clone)]
pub struct RegistryClient {
    http: Arc<dyn HttpClient>,
    config: RegistryConfig,
}

impl RegistryClient {
    pub fn new(http: Arc<dyn HttpClient>, config: RegistryConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Build a fresh service table.
    ///
    /// Only a failure of the registry search itself is an error. Individual entries that are
    /// malformed, filtered out, or unreachable are logged and skipped.
    #[instrument(name = "registry_fetch", skip_all, fields(registry = %self.config.url))]
    pub async fn fetch(&self) -> Result<ServiceTable, RegistryError> {
        let hits = self.search().await?;
        let total = hits.len();

        let mut providers = Vec::new();
        for (index, raw) in hits.into_iter().enumerate() {
            match self.admit(raw).await {
                Ok(provider) => {
                    debug!(
                        infores = %provider.infores,
                        url = %provider.base_url,
                        operations = provider.operations.len(),
                        "registered provider"
                    );
                    providers.push(provider);
                }
                Err(reason) => {
                    info!(hit = index, reason = %reason, "skipping registry entry");
                }
            }
        }

        let table = ServiceTable::from_providers(providers);
        info!(
            hits = total,
            providers = table.provider_count(),
            operations = table.len(),
            "registry loaded"
        );
        Ok(table)
    }

    fn search_url(&self) -> Result<Url, RegistryError> {
        let raw = format!("{}/query", self.config.url.trim_end_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| RegistryError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;
        url.query_pairs_mut()
            .append_pair("q", &self.config.query)
            .append_pair("size", &self.config.page_size.to_string())
            .append_pair("fields", SEARCH_FIELDS);
        Ok(url)
    }

    async fn search(&self) -> Result<Vec<serde_json::Value>, RegistryError> {
        let url = self.search_url()?;
        let resp = self
            .http
            .send(
                HttpRequest::get(url),
                self.config.fetch_timeout,
                self.config.max_response_bytes,
            )
            .await?;
        if !resp.is_success() {
            return Err(RegistryError::Status {
                status: resp.status,
            });
        }
        let page: RegistryPage = serde_json::from_slice(&resp.body)?;
        Ok(page.hits)
    }

    async fn admit(&self, raw: serde_json::Value) -> Result<Provider, HitRejection> {
        let hit: RegistryHit =
            serde_json::from_value(raw).map_err(|e| HitRejection::Malformed(e.to_string()))?;
        let provider = hit.into_provider(&self.config)?;
        self.probe(&provider.base_url).await?;
        Ok(provider)
    }

    /// Check that `<base>/query` exists.
    ///
    /// Anything other than a transport failure or a 404 counts as "exists": a 405 on GET or
    /// a 422 on an empty POST still proves the route is there.
    pub async fn probe(&self, base: &BaseUrl) -> Result<(), HitRejection> {
        let url = base.endpoint("query");
        let get = HttpRequest::get(url.clone());
        if self.probe_once(get, &url).await? != 404 {
            return Ok(());
        }

        let post = HttpRequest::post_json(url.clone(), &json!({}));
        match self.probe_once(post, &url).await? {
            404 => Err(HitRejection::NotFound {
                url: url.to_string(),
            }),
            _ => Ok(()),
        }
    }

    async fn probe_once(&self, req: HttpRequest, url: &Url) -> Result<u16, HitRejection> {
        let method = req.method.clone();
        match self
            .http
            .send(req, self.config.probe_timeout, PROBE_MAX_BYTES)
            .await
        {
            Ok(resp) => Ok(resp.status),
            // The endpoint answered; we just did not want all of it.
            Err(HttpError::ResponseTooLarge { .. }) => Ok(200),
            Err(e) => {
                warn!(url = %url, method = %method, error = %e, "probe failed");
                Err(HitRejection::Unreachable {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
