//! Connecting to the authority and the `version` subcommand.

use anyhow::{Context, Result};
use invoice_seal::client::Transport;
use invoice_seal::{ClientConfig, HttpTransport};

use crate::GlobalOpts;

/// Build client configuration: environment first, flags on top.
pub fn client_config(opts: &GlobalOpts) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("loading client configuration")?;
    if let Some(host) = &opts.host {
        config.host = ClientConfig::new(host)
            .with_context(|| format!("invalid --host {host}"))?
            .host;
    }
    if opts.skip_verify {
        config.skip_tls_verify = true;
    }
    Ok(config)
}

/// Connect to the configured authority.
pub fn connect(opts: &GlobalOpts) -> Result<HttpTransport> {
    let config = client_config(opts)?;
    tracing::debug!(host = %config.host, timeout = ?config.timeout, "authority configured");
    Ok(HttpTransport::new(config)?)
}

/// Execute the `version` subcommand.
pub async fn run_version(opts: &GlobalOpts) -> Result<u8> {
    let reply = connect(opts)?.version().await?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(0)
}
