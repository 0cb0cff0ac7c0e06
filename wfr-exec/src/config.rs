use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base of the registry query API, e.g. `https://smart-api.info/api`.
    pub url: String,
    pub query: String,
    pub page_size: usize,
    /// Only servers tagged with this `x-maturity` are registered.
    pub maturity: String,
    /// Providers must speak this protocol's major.minor.
    pub trapi_version: String,
    /// The runner's own infores; matching registry entries are skipped.
    pub self_infores: String,
    pub fetch_timeout: Duration,
    pub probe_timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://smart-api.info/api".to_string(),
            query: "TRAPI".to_string(),
            page_size: 1000,
            maturity: "production".to_string(),
            trapi_version: "1.4.0".to_string(),
            self_infores: "infores:workflow-runner".to_string(),
            fetch_timeout: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Standards schema document listing the operation kinds under `$defs`.
    pub schema_url: String,
    pub fetch_timeout: Duration,
    pub max_response_bytes: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            schema_url: "https://standards.ncats.io/operation/1.4.0/schema".to_string(),
            fetch_timeout: Duration::from_secs(30),
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub url: url::Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-call timeout when a step does not set `runner_parameters.timeout`.
    pub default_timeout: Duration,
    pub max_response_bytes: usize,
    /// Post-processing applied to every successful provider response, when set.
    pub normalizer: Option<NormalizerConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            max_response_bytes: 64 * 1024 * 1024,
            normalizer: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    pub registry: RegistryConfig,
    pub catalog: CatalogConfig,
    pub engine: EngineConfig,
    /// Background refresh period for the registry and operation tables. `None` disables it.
    pub refresh_interval: Option<Duration>,
}
