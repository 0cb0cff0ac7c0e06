use std::collections::BTreeSet;

use wfr_core::OperationId;

use crate::base_url::{BaseUrl, BaseUrlError};
use crate::config::RegistryConfig;
use crate::registry::error::HitRejection;
use crate::registry::provider::Provider;
use crate::registry::version::same_minor;

#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct RegistryPage {
    #[serde(default)]
    pub hits: Vec<serde_json::Value>,
}

/// One registry search hit: an OpenAPI document with translator extensions.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct RegistryHit {
    #[serde(default)]
    servers: Vec<ServerEntry>,

    #[serde(rename = "_meta", default)]
    meta: HitMeta,

    #[serde(default)]
    info: HitInfo,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ServerEntry {
    #[serde(default)]
    url: Option<String>,

    #[serde(rename = "x-maturity", default)]
    maturity: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct HitMeta {
    /// Where the OpenAPI document itself lives; relative server URLs resolve against it.
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct HitInfo {
    #[serde(default)]
    title: Option<String>,

    #[serde(rename = "x-translator", default)]
    translator: Option<TranslatorInfo>,

    #[serde(rename = "x-trapi", default)]
    trapi: Option<TrapiInfo>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct TranslatorInfo {
    #[serde(default)]
    infores: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct TrapiInfo {
    #[serde(default)]
    version: Option<String>,

    #[serde(default)]
    operations: Option<Vec<String>>,
}

impl RegistryHit {
    /// Apply the static admission rules. Reachability is checked separately.
    pub(crate) fn into_provider(self, config: &RegistryConfig) -> Result<Provider, HitRejection> {
        let infores = self
            .info
            .translator
            .and_then(|t| t.infores)
            .filter(|s| !s.trim().is_empty())
            .ok_or(HitRejection::MissingInfores)?;
        if infores == config.self_infores {
            return Err(HitRejection::SelfRegistration);
        }

        let base_url = resolve_server(&self.servers, self.meta.url.as_deref(), &config.maturity)?;

        let trapi = self.info.trapi.unwrap_or_default();
        let version = trapi.version.ok_or(HitRejection::MissingVersion)?;
        if !same_minor(&version, &config.trapi_version) {
            return Err(HitRejection::VersionMismatch {
                declared: version,
                expected: config.trapi_version.clone(),
            });
        }

        let operations: BTreeSet<OperationId> = trapi
            .operations
            .unwrap_or_default()
            .into_iter()
            .filter(|op| !op.trim().is_empty())
            .map(OperationId::from)
            .collect();
        if operations.is_empty() {
            return Err(HitRejection::NoOperations);
        }

        Ok(Provider {
            title: self.info.title.unwrap_or_else(|| infores.clone()),
            infores,
            base_url,
            maturity: config.maturity.clone(),
            version,
            operations,
        })
    }
}

/// First server at the wanted maturity whose URL resolves.
fn resolve_server(
    servers: &[ServerEntry],
    document_url: Option<&str>,
    maturity: &str,
) -> Result<BaseUrl, HitRejection> {
    let mut last_error = None;
    for server in servers
        .iter()
        .filter(|s| s.maturity.as_deref() == Some(maturity))
    {
        let Some(url) = server.url.as_deref() else {
            last_error = Some(BaseUrlError::Missing);
            continue;
        };
        let resolved = match document_url {
            Some(doc) => BaseUrl::resolve(url, doc),
            None => BaseUrl::parse(url),
        };
        match resolved {
            Ok(base) => return Ok(base),
            Err(e) => last_error = Some(e),
        }
    }
    match last_error {
        Some(e) => Err(HitRejection::Url(e)),
        None => Err(HitRejection::NoMatchingServer(maturity.to_string())),
    }
}
