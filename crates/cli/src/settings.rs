//! Config discovery and credentials.
//!
//! Config path: `--config` / `FILER_CONFIG` > `<config_dir>/invoice-filer/filer.toml`.
//! Access token: `--access-token` > `FILER_ACCESS_TOKEN` > error. The token
//! is never read from the config file.

use std::path::{Path, PathBuf};

use filer_google::{DRIVE_API_BASE, SHEETS_API_BASE};
use filer_recon::FilerConfig;
use serde::Deserialize;

use crate::exit_codes;
use crate::CliError;

pub const TOKEN_ENV: &str = "FILER_ACCESS_TOKEN";

/// API base URLs. Only overridden to point at a test server.
#[derive(Debug, Clone, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_drive")]
    pub drive: String,
    #[serde(default = "default_sheets")]
    pub sheets: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            drive: default_drive(),
            sheets: default_sheets(),
        }
    }
}

fn default_drive() -> String {
    DRIVE_API_BASE.to_string()
}

fn default_sheets() -> String {
    SHEETS_API_BASE.to_string()
}

#[derive(Debug, Default, Deserialize)]
struct EndpointsSection {
    #[serde(default)]
    endpoints: Endpoints,
}

#[derive(Debug)]
pub struct Settings {
    pub path: PathBuf,
    pub config: FilerConfig,
    pub endpoints: Endpoints,
}

/// Returns the path to the default config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("invoice-filer/filer.toml"))
}

pub fn resolve_config_path(flag: Option<PathBuf>) -> Result<PathBuf, CliError> {
    flag.or_else(default_config_path).ok_or_else(|| CliError {
        code: exit_codes::EXIT_USAGE,
        message: "cannot determine config directory".into(),
        hint: Some("pass --config <path> or set FILER_CONFIG".into()),
    })
}

pub fn load(flag: Option<PathBuf>) -> Result<Settings, CliError> {
    let path = resolve_config_path(flag)?;
    let text = std::fs::read_to_string(&path).map_err(|e| CliError {
        code: exit_codes::EXIT_USAGE,
        message: format!("cannot read config {}: {}", path.display(), e),
        hint: Some("pass --config <path> or set FILER_CONFIG".into()),
    })?;
    parse(&path, &text)
}

fn parse(path: &Path, text: &str) -> Result<Settings, CliError> {
    let config = FilerConfig::from_toml(text).map_err(|e| CliError {
        code: exit_codes::EXIT_USAGE,
        message: format!("{}: {}", path.display(), e),
        hint: None,
    })?;
    let section: EndpointsSection = toml::from_str(text).map_err(|e| CliError {
        code: exit_codes::EXIT_USAGE,
        message: format!("{}: [endpoints]: {}", path.display(), e),
        hint: None,
    })?;

    Ok(Settings {
        path: path.to_path_buf(),
        config,
        endpoints: section.endpoints,
    })
}

pub fn resolve_access_token(flag: Option<String>) -> Result<String, CliError> {
    if let Some(token) = flag {
        let trimmed = token.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
    } else if let Ok(token) = std::env::var(TOKEN_ENV) {
        let trimmed = token.trim().to_string();
        if !trimmed.is_empty() {
            return Ok(trimmed);
        }
    }

    Err(CliError {
        code: exit_codes::EXIT_STORE_NOT_AUTH,
        message: format!("missing Google access token (use --access-token or set {TOKEN_ENV})"),
        hint: Some("e.g. FILER_ACCESS_TOKEN=$(gcloud auth print-access-token)".into()),
    })
}
