//! Static configuration loaded once per run from `secrets.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::resolve::{NameRegistry, ResolverPolicy, FALLBACK_CATEGORY};

/// Default HTTP timeout for LLM and upload calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config has no categories")]
    NoCategories,
}

/// One allowed category and the kDrive directory it files into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFolder {
    pub label: String,
    pub directory_id: String,
}

/// An inbox subdirectory whose documents are additionally uploaded to a
/// second folder (e.g. everything from the tax scan inbox also goes to
/// the yearly tax collection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraUpload {
    pub inbox: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub first_names: Vec<String>,
    pub last_name: String,
    /// Ordered: label order is prompt order.
    pub categories: Vec<CategoryFolder>,
    pub kdrive_api_token: String,
    pub kdrive_drive_id: String,
    pub ai_product_id: String,
    #[serde(default)]
    pub extra_uploads: Vec<ExtraUpload>,
    #[serde(default)]
    pub resolver: ResolverPolicy,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;

        if config.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }
        if !config
            .categories
            .iter()
            .any(|c| c.label == FALLBACK_CATEGORY)
        {
            tracing::warn!(
                "No '{FALLBACK_CATEGORY}' category configured; fallback uploads will fail"
            );
        }

        Ok(config)
    }

    pub fn labels(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.label.clone()).collect()
    }

    pub fn directory_id(&self, label: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.directory_id.as_str())
    }

    pub fn name_registry(&self) -> NameRegistry {
        NameRegistry::new(self.first_names.clone(), &self.last_name)
    }

    /// Extra upload category for an inbox subdirectory, if configured.
    pub fn extra_upload_for(&self, inbox_name: &str) -> Option<&str> {
        self.extra_uploads
            .iter()
            .find(|e| e.inbox == inbox_name)
            .map(|e| e.category.as_str())
    }
}
