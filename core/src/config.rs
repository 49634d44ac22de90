//! Client configuration from the environment.

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::ApiError;

pub const API_URL_VAR: &str = "PET_API_URL";
pub const SESSION_FILE_VAR: &str = "PET_SESSION_FILE";
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Reads `PET_API_URL` and `PET_SESSION_FILE`, falling back to the
    /// local backend and the user's config directory.
    pub fn load() -> Result<Self, ApiError> {
        let api_url = var(API_URL_VAR).unwrap_or_else(|| {
            info!("{API_URL_VAR} not set, using default: {DEFAULT_API_URL}");
            DEFAULT_API_URL.to_string()
        });
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ApiError::InvalidInput(format!(
                "{API_URL_VAR} must be an http(s) URL, got {api_url}"
            )));
        }
        let session_file = match var(SESSION_FILE_VAR) {
            Some(path) => PathBuf::from(path),
            None => {
                let path = default_session_file()?;
                info!("{SESSION_FILE_VAR} not set, using default: {}", path.display());
                path
            }
        };
        Ok(Self {
            api_url,
            session_file,
        })
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_session_file() -> Result<PathBuf, ApiError> {
    dirs::config_dir()
        .map(|dir| dir.join("pettyworld").join("session.json"))
        .ok_or_else(|| ApiError::Storage("no user config directory available".to_string()))
}
