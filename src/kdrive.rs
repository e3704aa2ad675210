//! File upload to Infomaniak kDrive.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File not found: {0}")]
    FileNotFound(std::path::PathBuf),

    #[error("kDrive unreachable: {0}")]
    Connection(String),

    #[error("kDrive returned error (status {status}): {body}")]
    Endpoint { status: u16, body: String },

    #[error("Upload rejected: {0}")]
    Rejected(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Upload collaborator seam; the batch driver only needs "bytes of this
/// file land in that directory under that name".
pub trait Uploader {
    fn upload(
        &self,
        file_path: &Path,
        new_filename: &str,
        directory_id: &str,
    ) -> Result<(), UploadError>;
}

/// Blocking kDrive client: single-request octet-stream upload.
pub struct KdriveUploader {
    api_token: String,
    drive_id: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct UploadResponse {
    result: Option<String>,
}

impl KdriveUploader {
    pub fn new(api_token: &str, drive_id: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_token: api_token.to_string(),
            drive_id: drive_id.to_string(),
            client,
        }
    }
}

impl Uploader for KdriveUploader {
    fn upload(
        &self,
        file_path: &Path,
        new_filename: &str,
        directory_id: &str,
    ) -> Result<(), UploadError> {
        if !file_path.is_file() {
            return Err(UploadError::FileNotFound(file_path.to_path_buf()));
        }
        let data = std::fs::read(file_path)?;
        let total_size = data.len();

        tracing::info!(
            file = %file_path.display(),
            new_name = new_filename,
            directory_id,
            "Uploading to kDrive"
        );

        let url = format!(
            "https://api.infomaniak.com/3/drive/{}/upload",
            self.drive_id
        );
        let response = self
            .client
            .post(&url)
            .query(&[
                ("total_size", total_size.to_string().as_str()),
                ("directory_id", directory_id),
                ("file_name", new_filename),
            ])
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/octet-stream")
            .body(data)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    UploadError::Connection(url.clone())
                } else {
                    UploadError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(UploadError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| UploadError::HttpClient(e.to_string()))?;
        check_upload_response(&body)
    }
}

/// kDrive signals success inside the JSON body, not via HTTP status alone.
fn check_upload_response(body: &str) -> Result<(), UploadError> {
    let parsed: UploadResponse =
        serde_json::from_str(body).map_err(|e| UploadError::Rejected(e.to_string()))?;
    match parsed.result.as_deref() {
        Some("success") => Ok(()),
        _ => Err(UploadError::Rejected(body.to_string())),
    }
}

/// Mock uploader recording calls, for driver tests.
pub struct MockUploader {
    pub uploads: std::sync::Mutex<Vec<(String, String)>>,
    pub fail: bool,
}

impl MockUploader {
    pub fn new() -> Self {
        Self {
            uploads: std::sync::Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            uploads: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

impl Uploader for MockUploader {
    fn upload(
        &self,
        _file_path: &Path,
        new_filename: &str,
        directory_id: &str,
    ) -> Result<(), UploadError> {
        if self.fail {
            return Err(UploadError::Rejected("mock failure".into()));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((new_filename.to_string(), directory_id.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_is_accepted() {
        assert!(check_upload_response(r#"{"result": "success", "data": {}}"#).is_ok());
    }

    #[test]
    fn error_body_is_rejected() {
        let err = check_upload_response(r#"{"result": "error", "error": "quota"}"#);
        assert!(matches!(err, Err(UploadError::Rejected(_))));
    }

    #[test]
    fn non_json_body_is_rejected() {
        assert!(check_upload_response("<html>").is_err());
    }

    #[test]
    fn missing_file_is_reported_before_any_request() {
        let uploader = KdriveUploader::new("t", "d", 5);
        let err = uploader.upload(Path::new("/nonexistent/datei.pdf"), "neu.pdf", "101");
        assert!(matches!(err, Err(UploadError::FileNotFound(_))));
    }
}
