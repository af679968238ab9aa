//! Authentication strategies.
//!
//! # Design
//! A client picks exactly one `Authentication` when it is built and keeps it
//! for its whole lifetime. Each strategy answers two questions: which
//! headers to attach to a request, and which TLS identity (if any) the
//! transport must present. The dispatcher only ever asks those questions; it
//! never branches on the concrete strategy.
//!
//! Credentials are checked at construction. Producing headers afterwards is
//! infallible and does no I/O.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};

use crate::config::Config;
use crate::error::{ApiError, Result};

/// Authorization via `Authorization: Bearer <token>`.
#[derive(Debug)]
pub struct BearerAuth {
    token: SecretString,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ApiError::Config("bearer token must not be empty".to_string()));
        }
        Ok(Self {
            token: SecretString::new(token.into_boxed_str()),
        })
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.token.expose_secret()),
        )]
    }
}

/// A PKCS#12 bundle on disk plus the passphrase that decrypts it.
#[derive(Debug)]
pub struct ClientIdentity {
    bundle_path: PathBuf,
    passphrase: SecretString,
}

impl ClientIdentity {
    pub fn bundle_path(&self) -> &Path {
        &self.bundle_path
    }

    pub fn passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }
}

/// Mutual TLS with a client certificate taken from the configuration.
#[derive(Debug)]
pub struct CertificateAuth {
    identity: ClientIdentity,
}

impl CertificateAuth {
    /// Fails when the config lacks either the bundle path or the passphrase.
    pub fn from_config(config: &Config) -> Result<Self> {
        let bundle_path = config.certificate_bundle_path().ok_or_else(|| {
            ApiError::Config("client certificate auth needs a PKCS#12 bundle path".to_string())
        })?;
        let passphrase = config.certificate_passphrase().ok_or_else(|| {
            ApiError::Config("client certificate auth needs a PKCS#12 passphrase".to_string())
        })?;
        Ok(Self {
            identity: ClientIdentity {
                bundle_path: bundle_path.to_path_buf(),
                passphrase: SecretString::new(passphrase.expose_secret().into()),
            },
        })
    }
}

#[derive(Debug)]
pub enum Authentication {
    Bearer(BearerAuth),
    ClientCertificate(CertificateAuth),
}

impl Authentication {
    pub fn bearer(token: impl Into<String>) -> Result<Self> {
        BearerAuth::new(token).map(Authentication::Bearer)
    }

    pub fn client_certificate(config: &Config) -> Result<Self> {
        CertificateAuth::from_config(config).map(Authentication::ClientCertificate)
    }

    /// Headers this strategy contributes to every request.
    pub fn authorization_headers(&self) -> Vec<(String, String)> {
        match self {
            Authentication::Bearer(auth) => auth.headers(),
            Authentication::ClientCertificate(_) => Vec::new(),
        }
    }

    /// TLS identity the transport must present, if any.
    pub fn client_identity(&self) -> Option<&ClientIdentity> {
        match self {
            Authentication::Bearer(_) => None,
            Authentication::ClientCertificate(auth) => Some(&auth.identity),
        }
    }

    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Authentication::Bearer(_) => "bearer",
            Authentication::ClientCertificate(_) => "client-certificate",
        }
    }
}
