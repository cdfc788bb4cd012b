//! HTTP transport to a live authority.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::messages::{routes, ErrorReply, NewInvoice, NewInvoiceReply, VersionReply};
use crate::retry::Backoff;
use crate::transport::Transport;

/// [`Transport`] over HTTPS with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.skip_tls_verify)
            .build()
            .map_err(|e| ClientError::transport(config.host.as_str(), e))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn version(&self) -> Result<VersionReply> {
        let url = self.config.endpoint(routes::VERSION);
        debug!(%url, "requesting authority version");

        let (http, url) = (&self.http, &url);
        Backoff::new(self.config.max_retries)
            .run(routes::VERSION, move || async move {
                let resp = http
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| ClientError::transport(routes::VERSION, e))?;
                read_reply(routes::VERSION, resp).await
            })
            .await
    }

    async fn new_invoice(&self, request: &NewInvoice) -> Result<NewInvoiceReply> {
        let url = self.config.endpoint(routes::NEW_INVOICE);
        debug!(%url, files = request.files.len(), "submitting invoice");

        // Never retried: a lost reply does not mean a lost submission.
        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::transport(routes::NEW_INVOICE, e))?;
        read_reply(routes::NEW_INVOICE, resp).await
    }
}

async fn read_reply<T: DeserializeOwned>(endpoint: &str, resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| ClientError::transport(endpoint, e))?;

    if status.is_client_error() {
        let (code, context) = match serde_json::from_slice::<ErrorReply>(&body) {
            Ok(reply) => (reply.error_code, reply.error_context),
            Err(_) => (0, vec![body_text(&body)]),
        };
        warn!(endpoint, status = status.as_u16(), code, "authority rejected request");
        return Err(ClientError::Server {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            code,
            context,
        });
    }
    if !status.is_success() {
        // A 5xx says nothing about whether the request was applied.
        warn!(endpoint, status = status.as_u16(), "upstream failure");
        return Err(ClientError::Upstream {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message: body_text(&body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

fn body_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).trim().to_string()
}
