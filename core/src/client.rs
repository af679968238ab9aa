//! Authenticated request dispatch for the BAILO API.
//!
//! # Design
//! `BailoApi` owns one `Config`, one `Authentication` and one `Transport`
//! for its whole lifetime and keeps no state between calls. Every verb goes
//! through the same three steps: `build_request` (pure), `Transport::execute`
//! (the only I/O), then `response::classify`. The authentication strategy
//! only influences the headers produced here and the TLS identity baked
//! into the transport; URL formation and classification are the same for
//! both strategies.

use std::path::Path;

use serde::Serialize;

use crate::auth::Authentication;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::http::{form_url, merge_headers, HttpMethod, HttpRequest};
use crate::response::{classify, ApiResponse};
use crate::transport::{Transport, UreqTransport};

pub type Params = Vec<(String, String)>;
pub type Headers = Vec<(String, String)>;

pub struct BailoApi {
    config: Config,
    auth: Authentication,
    transport: Box<dyn Transport>,
}

impl BailoApi {
    /// Build a client backed by a blocking ureq agent configured for `auth`.
    pub fn new(config: Config, auth: Authentication) -> Result<Self> {
        let transport = UreqTransport::new(&config, &auth)?;
        Ok(Self::with_transport(config, auth, Box::new(transport)))
    }

    pub fn with_transport(
        config: Config,
        auth: Authentication,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            config,
            auth,
            transport,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn authentication(&self) -> &Authentication {
        &self.auth
    }

    /// GET `path` and parse the JSON response.
    pub fn get(
        &self,
        path: &str,
        query: Option<Params>,
        headers: Option<Headers>,
    ) -> Result<ApiResponse> {
        let request = self.build_request::<()>(HttpMethod::Get, path, query, None, headers)?;
        self.dispatch(request, None)
    }

    /// GET `path` and unpack the ZIP response body into `output_dir`.
    pub fn get_files(
        &self,
        path: &str,
        query: Option<Params>,
        headers: Option<Headers>,
        output_dir: &Path,
    ) -> Result<ApiResponse> {
        let request = self.build_request::<()>(HttpMethod::Get, path, query, None, headers)?;
        self.dispatch(request, Some(output_dir))
    }

    /// POST `body` as JSON.
    pub fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        query: Option<Params>,
        headers: Option<Headers>,
    ) -> Result<ApiResponse> {
        let request = self.build_request(HttpMethod::Post, path, query, Some(body), headers)?;
        self.dispatch(request, None)
    }

    /// PUT `body` as JSON.
    pub fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        query: Option<Params>,
        headers: Option<Headers>,
    ) -> Result<ApiResponse> {
        let request = self.build_request(HttpMethod::Put, path, query, Some(body), headers)?;
        self.dispatch(request, None)
    }

    /// Assemble the request without sending it.
    ///
    /// Request bodies are always JSON-encoded, whatever content type the
    /// caller declares; a string body is sent as a JSON string literal.
    /// `Content-Type: application/json` is added unless the caller already set
    /// a content type. Authentication headers always win over caller headers
    /// of the same name.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<Params>,
        body: Option<&B>,
        headers: Option<Headers>,
    ) -> Result<HttpRequest> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::Serialization)?;

        let mut headers = headers;
        if body.is_some() {
            let caller = headers.get_or_insert_with(Vec::new);
            if !caller
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            {
                caller.push(("Content-Type".to_string(), "application/json".to_string()));
            }
        }

        Ok(HttpRequest {
            method,
            url: form_url(self.config.base_url(), path),
            query: query.unwrap_or_default(),
            headers: merge_headers(headers, self.auth.authorization_headers()),
            body,
        })
    }

    fn dispatch(&self, request: HttpRequest, output_dir: Option<&Path>) -> Result<ApiResponse> {
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            auth = self.auth.kind(),
            "dispatching request"
        );
        let response = self.transport.execute(&request)?;
        classify(response, output_dir)
    }
}
