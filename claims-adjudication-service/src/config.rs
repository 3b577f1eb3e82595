use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SCORING_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration, read once from the environment at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server listens on (`BIND_ADDR`)
    pub bind_addr: String,
    /// Base URL of the remote scoring service (`SCORING_SERVICE_URL`);
    /// unset means claims are evaluated locally
    pub scoring_service_url: Option<String>,
    /// Per-request timeout for the scoring service (`SCORING_TIMEOUT_SECS`)
    pub scoring_timeout: Duration,
    /// Whether stage pacing delays are applied (`PACING`, on unless
    /// set to off/false/0)
    pub pacing: bool,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let scoring_service_url = std::env::var("SCORING_SERVICE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let scoring_timeout = std::env::var("SCORING_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_SCORING_TIMEOUT_SECS));

        let pacing = std::env::var("PACING")
            .map(|raw| parse_switch(&raw))
            .unwrap_or(true);

        Self {
            bind_addr,
            scoring_service_url,
            scoring_timeout,
            pacing,
        }
    }
}

fn parse_switch(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "off" | "false" | "0" | "no"
    )
}
