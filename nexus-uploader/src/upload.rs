#![doc = "HTTP transport for the CLI: bridges the core `Transport` trait to a real Nexus server."]
//
//! # Nexus Transport (CLI <-> Core)
//!
//! This module wires the [`Transport`] abstraction from
//! [`nexus_uploader_core::contract`] to `reqwest`. The core decides *what* to
//! probe and upload; [`NexusClient`] only performs the request and maps the
//! response status through the core's classification functions.
//!
//! - `probe` issues `HEAD {url}`.
//! - `upload` issues `PUT {url}` with the raw file bytes as the body.
//! - Both attach HTTP Basic authentication when credentials are configured.
//!
//! Connection failures, timeouts and request build errors surface as
//! [`TransportError::Transport`] and are marked transient so the core retry
//! policy may try again.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use nexus_uploader_core::checker::classify_probe_status;
use nexus_uploader_core::contract::{Credentials, Presence, Transport, TransportError};
use nexus_uploader_core::uploader::classify_upload_status;
use reqwest::{Method, RequestBuilder};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct NexusClient {
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl NexusClient {
    pub fn new(credentials: Option<Credentials>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nexus-uploader/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::info!(
            auth_set = credentials.is_some(),
            timeout_secs = timeout.as_secs(),
            "Initialized NexusClient"
        );
        Ok(Self { http, credentials })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Some(c) => builder.basic_auth(&c.username, Some(&c.password)),
            None => builder,
        }
    }
}

fn transport_error(err: reqwest::Error) -> TransportError {
    TransportError::Transport {
        transient: err.is_timeout() || err.is_connect() || err.is_request(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Transport for NexusClient {
    async fn probe(&self, url: &str) -> Result<Presence, TransportError> {
        tracing::debug!(url, "Checking for existing artifact");
        let response = self
            .request(Method::HEAD, url)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url, "HEAD request failed");
                transport_error(e)
            })?;
        classify_probe_status(response.status().as_u16())
    }

    async fn upload(&self, url: &str, body: Bytes) -> Result<(), TransportError> {
        tracing::debug!(url, bytes = body.len(), "Uploading artifact");
        let response = self
            .request(Method::PUT, url)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, url, "PUT request failed");
                transport_error(e)
            })?;
        classify_upload_status(response.status().as_u16())
    }
}
