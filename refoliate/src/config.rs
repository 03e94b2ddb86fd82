//! FOLIO credential loading
//!
//! Credentials are resolved per value: environment variable first, then the
//! user's config file (`~/.config/refoliate/config.toml`). All three values
//! must be present and the Okapi URL must be well-formed before any restore
//! logic runs.

use crate::error::{RestoreError, Result};
use std::path::PathBuf;

const ENV_URL: &str = "FOLIO_OKAPI_URL";
const ENV_TOKEN: &str = "FOLIO_OKAPI_TOKEN";
const ENV_TENANT: &str = "FOLIO_OKAPI_TENANT_ID";

/// Okapi connection settings, built once at startup and handed to
/// `FolioClient::new` by value
#[derive(Debug, Clone)]
pub struct FolioConfig {
    /// Okapi gateway base URL, without a trailing slash
    pub okapi_url: String,
    /// Value for the x-okapi-token header
    pub token: String,
    /// Value for the x-okapi-tenant header
    pub tenant_id: String,
}

impl FolioConfig {
    /// Resolve credentials from the environment and the config file
    pub fn load() -> Result<Self> {
        let file = read_config_file();
        let okapi_url = resolve(ENV_URL, "okapi_url", file.as_ref())
            .ok_or_else(|| RestoreError::Config(format!("{} is not set", ENV_URL)))?;
        let token = resolve(ENV_TOKEN, "okapi_token", file.as_ref())
            .ok_or_else(|| RestoreError::Config(format!("{} is not set", ENV_TOKEN)))?;
        let tenant_id = resolve(ENV_TENANT, "okapi_tenant_id", file.as_ref())
            .ok_or_else(|| RestoreError::Config(format!("{} is not set", ENV_TENANT)))?;

        Self::from_parts(okapi_url, token, tenant_id)
    }

    /// Validate raw credential values and normalize the URL
    pub fn from_parts(okapi_url: String, token: String, tenant_id: String) -> Result<Self> {
        if token.is_empty() {
            return Err(RestoreError::Config(format!("{} is empty", ENV_TOKEN)));
        }
        if tenant_id.is_empty() {
            return Err(RestoreError::Config(format!("{} is empty", ENV_TENANT)));
        }

        let parsed = reqwest::Url::parse(&okapi_url).map_err(|e| {
            RestoreError::Config(format!("{} is not a valid URL: {}", ENV_URL, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RestoreError::Config(format!(
                "{} must be an http(s) URL, got {}",
                ENV_URL, okapi_url
            )));
        }

        Ok(Self {
            okapi_url: okapi_url.trim_end_matches('/').to_string(),
            token,
            tenant_id,
        })
    }
}

/// Priority 1: environment variable; priority 2: config file key
fn resolve(env_name: &str, file_key: &str, file: Option<&toml::Value>) -> Option<String> {
    if let Ok(value) = std::env::var(env_name) {
        if !value.is_empty() {
            return Some(value);
        }
    }

    file.and_then(|config| config.get(file_key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("refoliate").join("config.toml"))
}

fn read_config_file() -> Option<toml::Value> {
    let path = config_file_path()?;
    if !path.exists() {
        return None;
    }
    tracing::debug!(path = %path.display(), "reading credentials from config file");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), "config file is not valid TOML: {}", e);
            None
        }
    }
}
