use std::time::Duration;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RegistryArgs {
    /// Registry query API base, e.g. https://smart-api.info/api
    #[arg(long, env = "WFR_REGISTRY_URL")]
    pub registry_url: Option<String>,
    /// Only register servers tagged with this x-maturity.
    #[arg(long, env = "WFR_MATURITY")]
    pub maturity: Option<String>,
    #[arg(long, env = "WFR_TRAPI_VERSION")]
    pub trapi_version: Option<String>,
    /// Our own infores; registry entries carrying it are skipped.
    #[arg(long)]
    pub self_infores: Option<String>,
    /// Seconds to wait for a provider's query endpoint while probing.
    #[arg(long, value_parser = parse_seconds)]
    pub probe_timeout: Option<Duration>,
}

#[derive(Debug, Args, Clone)]
pub struct CatalogArgs {
    /// Operation schema document listing the supported operations under `$defs`.
    #[arg(long, env = "WFR_OPERATIONS_URL")]
    pub operations_url: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Seconds per provider call when a step sets no timeout of its own.
    #[arg(long, value_parser = parse_seconds)]
    pub timeout: Option<Duration>,
    #[arg(long, env = "WFR_NORMALIZER_URL")]
    pub normalizer_url: Option<url::Url>,
    #[arg(long, value_parser = parse_seconds, default_value = "10")]
    pub normalizer_timeout: Duration,
    #[arg(long)]
    pub max_response_bytes: Option<usize>,
}

fn parse_seconds(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .parse()
        .map_err(|e| format!("invalid number of seconds '{raw}': {e}"))?;
    if secs <= 0.0 {
        return Err(format!("seconds must be positive, got {raw}"));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("invalid number of seconds '{raw}': {e}"))
}
