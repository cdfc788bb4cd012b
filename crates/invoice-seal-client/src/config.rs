//! Client configuration.
//!
//! Defaults target a local authority. Override via environment variables or
//! explicit construction.

use std::time::Duration;

use url::Url;

/// Default authority address.
pub const DEFAULT_HOST: &str = "https://127.0.0.1:4443";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of retries for idempotent requests.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for connecting to an authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Authority base URL. The API route is appended to it.
    pub host: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt, for idempotent requests only.
    pub max_retries: u32,
    /// Accept self-signed authority certificates.
    pub skip_tls_verify: bool,
}

impl ClientConfig {
    /// Configuration for `host` with default timeout and retries.
    pub fn new(host: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: parse_host("host", host)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            skip_tls_verify: false,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `INVOICE_SEAL_HOST` (default: `https://127.0.0.1:4443`)
    /// - `INVOICE_SEAL_TIMEOUT_SECS` (default: 30)
    /// - `INVOICE_SEAL_MAX_RETRIES` (default: 3)
    /// - `INVOICE_SEAL_SKIP_TLS_VERIFY` (`1` or `true` to enable)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("INVOICE_SEAL_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        Ok(Self {
            host: parse_host("INVOICE_SEAL_HOST", &raw)?,
            timeout: Duration::from_secs(env_number(
                "INVOICE_SEAL_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            max_retries: env_number("INVOICE_SEAL_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            skip_tls_verify: std::env::var("INVOICE_SEAL_SKIP_TLS_VERIFY")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }

    /// Full URL for an API route such as `/version`.
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}{}{}",
            self.host.as_str().trim_end_matches('/'),
            crate::messages::API_ROUTE,
            route
        )
    }
}

fn parse_host(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            source.to_string(),
            format!("unsupported scheme {other}"),
        )),
    }
}

fn env_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(var.to_string(), raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid number for {0}: {1:?}")]
    InvalidNumber(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_route() {
        let cfg = ClientConfig::new("http://127.0.0.1:9000").unwrap();
        assert_eq!(
            cfg.endpoint("/version"),
            "http://127.0.0.1:9000/api/v1/version"
        );

        let cfg = ClientConfig::new("https://authority.example/prefix/").unwrap();
        assert_eq!(
            cfg.endpoint("/invoices/new"),
            "https://authority.example/prefix/api/v1/invoices/new"
        );
    }

    #[test]
    fn test_rejects_bad_hosts() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://authority.example"),
            Err(ConfigError::InvalidUrl(..))
        ));
    }

    #[test]
    fn test_default_targets_local_authority() {
        let cfg = ClientConfig::new(DEFAULT_HOST).unwrap();
        assert_eq!(cfg.host.as_str(), "https://127.0.0.1:4443/");
        assert_eq!(cfg.max_retries, DEFAULT_MAX_RETRIES);
        assert!(!cfg.skip_tls_verify);
    }

    #[test]
    fn test_env_number_falls_back_when_unset() {
        assert_eq!(env_number("INVOICE_SEAL_NONEXISTENT_12345", 7u32).unwrap(), 7);
    }
}
