use wfr_exec::{CatalogConfig, EngineConfig, NormalizerConfig, RegistryConfig, RunnerConfig};

use crate::{CatalogArgs, EngineArgs, RegistryArgs};

pub fn registry_config(args: &RegistryArgs) -> RegistryConfig {
    let mut config = RegistryConfig::default();
    if let Some(url) = &args.registry_url {
        config.url = url.clone();
    }
    if let Some(maturity) = &args.maturity {
        config.maturity = maturity.clone();
    }
    if let Some(version) = &args.trapi_version {
        config.trapi_version = version.clone();
    }
    if let Some(infores) = &args.self_infores {
        config.self_infores = infores.clone();
    }
    if let Some(timeout) = args.probe_timeout {
        config.probe_timeout = timeout;
    }
    config
}

pub fn catalog_config(args: &CatalogArgs) -> CatalogConfig {
    let mut config = CatalogConfig::default();
    if let Some(url) = &args.operations_url {
        config.schema_url = url.clone();
    }
    config
}

pub fn engine_config(args: &EngineArgs) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(timeout) = args.timeout {
        config.default_timeout = timeout;
    }
    if let Some(max) = args.max_response_bytes {
        config.max_response_bytes = max;
    }
    config.normalizer = args.normalizer_url.clone().map(|url| NormalizerConfig {
        url,
        timeout: args.normalizer_timeout,
    });
    config
}

pub fn runner_config(
    registry: &RegistryArgs,
    catalog: &CatalogArgs,
    engine: &EngineArgs,
) -> RunnerConfig {
    RunnerConfig {
        registry: registry_config(registry),
        catalog: catalog_config(catalog),
        engine: engine_config(engine),
        refresh_interval: None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn unset_flags_keep_defaults() {
        let args = RegistryArgs {
            registry_url: None,
            maturity: Some("testing".to_string()),
            trapi_version: None,
            self_infores: None,
            probe_timeout: Some(Duration::from_secs(1)),
        };
        let config = registry_config(&args);
        assert_eq!(config.maturity, "testing");
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
        assert_eq!(config.url, RegistryConfig::default().url);
    }

    #[test]
    fn normalizer_is_enabled_by_url() {
        let args = EngineArgs {
            timeout: None,
            normalizer_url: Some(url::Url::parse("https://nn.example.org/query").unwrap()),
            normalizer_timeout: Duration::from_secs(4),
            max_response_bytes: None,
        };
        let config = engine_config(&args);
        let normalizer = config.normalizer.unwrap();
        assert_eq!(normalizer.timeout, Duration::from_secs(4));
        assert_eq!(config.default_timeout, EngineConfig::default().default_timeout);
    }
}
