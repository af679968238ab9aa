//! Authenticated, blocking HTTP access to a BAILO model-management service.
//!
//! # Overview
//! `BailoApi` forms URLs under a configured base, attaches credentials from
//! one authentication strategy (bearer token or PKCS#12 client certificate),
//! sends GET/POST/PUT requests with a fixed 5 second timeout and classifies
//! the response into parsed JSON, an extracted file bundle, or an error.
//!
//! # Design
//! - Request building and response classification are pure; only the
//!   `Transport` touches the network, so both are testable with canned data.
//! - The strategy is fixed per client. It yields headers and, for mutual TLS,
//!   the identity the transport presents; nothing branches on its type.
//! - No retries, caching or sessions. Every call stands alone.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod transport;

pub use auth::{Authentication, BearerAuth, CertificateAuth, ClientIdentity};
pub use client::{BailoApi, Headers, Params};
pub use config::Config;
pub use error::{ApiError, Result};
pub use http::{form_url, merge_headers, HttpMethod, HttpRequest, HttpResponse};
pub use response::{classify, extract_archive, ApiResponse};
pub use transport::{Transport, UreqTransport, REQUEST_TIMEOUT};
