//! Connection settings for a BAILO instance.
//!
//! # Design
//! `Config` is immutable once built. The base URL is stored without a
//! trailing slash so URL formation only ever has to add one separator.
//! Certificate bundle path and passphrase are optional here and validated
//! when a client-certificate strategy is constructed from them.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use crate::error::{ApiError, Result};

pub const ENV_URL: &str = "BAILO_URL";
pub const ENV_CA_VERIFY: &str = "BAILO_CA_VERIFY";
pub const ENV_PKCS12_FILENAME: &str = "BAILO_PKCS12_FILENAME";
pub const ENV_PKCS12_PASSWORD: &str = "BAILO_PKCS12_PASSWORD";

#[derive(Debug)]
pub struct Config {
    base_url: String,
    verify_certificates: bool,
    certificate_bundle_path: Option<PathBuf>,
    certificate_passphrase: Option<SecretString>,
}

impl Config {
    /// Create a config for `base_url` with certificate verification enabled.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ApiError::Config("base URL must not be empty".to_string()));
        }
        Ok(Self {
            base_url: base_url.to_string(),
            verify_certificates: true,
            certificate_bundle_path: None,
            certificate_passphrase: None,
        })
    }

    pub fn with_verify_certificates(mut self, verify: bool) -> Self {
        self.verify_certificates = verify;
        self
    }

    /// Attach a PKCS#12 bundle and the passphrase that unlocks it.
    pub fn with_certificate_bundle(
        mut self,
        path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.certificate_bundle_path = Some(path.into());
        self.certificate_passphrase = Some(SecretString::new(passphrase.into().into_boxed_str()));
        self
    }

    /// Read settings from `BAILO_URL`, `BAILO_CA_VERIFY`,
    /// `BAILO_PKCS12_FILENAME` and `BAILO_PKCS12_PASSWORD`.
    ///
    /// The two PKCS#12 variables must be set together or not at all.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| ApiError::Config(format!("{ENV_URL} is not set")))?;
        let mut config = Config::new(&url)?;

        if let Ok(raw) = std::env::var(ENV_CA_VERIFY) {
            config.verify_certificates = parse_bool(&raw).ok_or_else(|| {
                ApiError::Config(format!("{ENV_CA_VERIFY} is not a boolean: {raw:?}"))
            })?;
        }

        match (
            std::env::var(ENV_PKCS12_FILENAME).ok(),
            std::env::var(ENV_PKCS12_PASSWORD).ok(),
        ) {
            (Some(path), Some(passphrase)) => {
                config = config.with_certificate_bundle(path, passphrase);
            }
            (None, None) => {}
            _ => {
                return Err(ApiError::Config(format!(
                    "{ENV_PKCS12_FILENAME} and {ENV_PKCS12_PASSWORD} must be set together"
                )))
            }
        }

        Ok(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn verify_certificates(&self) -> bool {
        self.verify_certificates
    }

    pub fn certificate_bundle_path(&self) -> Option<&Path> {
        self.certificate_bundle_path.as_deref()
    }

    pub fn certificate_passphrase(&self) -> Option<&SecretString> {
        self.certificate_passphrase.as_ref()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
