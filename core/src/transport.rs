//! Blocking HTTP execution.
//!
//! # Design
//! `Transport` is the single I/O seam: it turns an `HttpRequest` into an
//! `HttpResponse` and nothing more. Non-2xx statuses come back as data so
//! that the classifier, not the transport, decides what they mean.
//!
//! `UreqTransport` builds one agent up front. Its TLS connector honors the
//! verification flag from `Config`, and presents a PKCS#12 identity when the
//! authentication strategy provides one.

use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{Authentication, ClientIdentity};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse};

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &Config, auth: &Authentication) -> Result<Self> {
        let mut tls = native_tls::TlsConnector::builder();
        tls.danger_accept_invalid_certs(!config.verify_certificates());
        tls.danger_accept_invalid_hostnames(!config.verify_certificates());
        if let Some(identity) = auth.client_identity() {
            tls.identity(load_identity(identity)?);
        }
        let connector = tls
            .build()
            .map_err(|e| ApiError::Tls(format!("building TLS connector: {e}")))?;

        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .tls_connector(Arc::new(connector))
            .build();
        Ok(Self { agent })
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (key, value) in &request.query {
            call = call.query(key, value);
        }
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let result = match &request.body {
            Some(body) => call.send_string(body),
            None => call.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => return Err(ApiError::Transport(Box::new(err))),
        };
        into_http_response(response)
    }
}

fn into_http_response(response: ureq::Response) -> Result<HttpResponse> {
    let status = response.status();
    let reason = response.status_text().to_string();
    let mut body = Vec::new();
    response.into_reader().read_to_end(&mut body)?;

    Ok(HttpResponse {
        status,
        reason,
        body,
    })
}

fn load_identity(identity: &ClientIdentity) -> Result<native_tls::Identity> {
    let path = identity.bundle_path();
    let der = std::fs::read(path).map_err(|e| {
        ApiError::Tls(format!("reading PKCS#12 bundle {}: {e}", path.display()))
    })?;
    native_tls::Identity::from_pkcs12(&der, identity.passphrase()).map_err(|e| {
        ApiError::Tls(format!("decoding PKCS#12 bundle {}: {e}", path.display()))
    })
}
