//! Response classification and archive extraction.
//!
//! Status handling, checked in order:
//! - 2xx with an output directory: unpack the ZIP body there.
//! - 2xx otherwise: the body must be JSON.
//! - 401: JSON body becomes `ApiError::Unauthorized`, anything else a
//!   plain status error.
//! - anything else: a JSON body is handed back as a diagnostic payload,
//!   otherwise a plain status error.

use std::io::{self, Cursor};
use std::path::Path;

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

/// Directory that macOS archivers embed alongside the real content.
pub const MACOS_METADATA_DIR: &str = "__MACOSX";

/// Successful outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Parsed JSON body. Also used for non-2xx statuses whose body is JSON.
    Json(Value),
    /// The archive body was unpacked; carries the response status.
    FilesExtracted(u16),
}

impl ApiResponse {
    pub fn into_json(self) -> Option<Value> {
        match self {
            ApiResponse::Json(value) => Some(value),
            ApiResponse::FilesExtracted(_) => None,
        }
    }
}

pub fn classify(response: HttpResponse, output_dir: Option<&Path>) -> Result<ApiResponse> {
    tracing::debug!(status = response.status, "classifying response");

    if response.is_success() {
        if let Some(dir) = output_dir {
            extract_archive(&response.body, dir)?;
            return Ok(ApiResponse::FilesExtracted(response.status));
        }
        return serde_json::from_slice(&response.body)
            .map(ApiResponse::Json)
            .map_err(ApiError::Deserialization);
    }

    let parsed = serde_json::from_slice::<Value>(&response.body);

    if response.status == 401 {
        return Err(match parsed {
            Ok(payload) => ApiError::Unauthorized { payload },
            Err(_) => status_error(&response),
        });
    }

    match parsed {
        Ok(payload) => Ok(ApiResponse::Json(payload)),
        Err(_) => Err(status_error(&response)),
    }
}

fn status_error(response: &HttpResponse) -> ApiError {
    ApiError::Status {
        status: response.status,
        reason: response.reason.clone(),
        body: String::from_utf8_lossy(&response.body).into_owned(),
    }
}

/// Unpack a ZIP byte stream into `output_dir`, then drop any `__MACOSX`
/// directory it left behind. Returns the number of archive entries.
pub fn extract_archive(content: &[u8], output_dir: &Path) -> Result<usize> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))?;
    let entries = archive.len();

    std::fs::create_dir_all(output_dir)?;
    archive.extract(output_dir)?;
    tracing::info!(entries, dir = %output_dir.display(), "extracted archive");

    remove_metadata_dir(output_dir);
    Ok(entries)
}

/// Advisory cleanup; never fails the extraction.
fn remove_metadata_dir(output_dir: &Path) {
    let metadata_dir = output_dir.join(MACOS_METADATA_DIR);
    match std::fs::remove_dir_all(&metadata_dir) {
        Ok(()) => tracing::debug!(dir = %metadata_dir.display(), "removed archive metadata"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::warn!(error = %err, dir = %metadata_dir.display(), "could not remove archive metadata")
        }
    }
}
