//! Runtime configuration.
//!
//! Layered lowest to highest: built-in defaults, the TOML file in the user's
//! config directory, `.env`, then `FEEDBACK_*` environment variables.

use config::{Config, Environment, File, FileFormat};
use directories::BaseDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "https://feedback-back-nrf3.onrender.com/api";
pub const ENV_PREFIX: &str = "FEEDBACK";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("api_base is not a valid URL: {0}")]
    InvalidApiBase(#[from] url::ParseError),
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Settings {
    pub api_base: String,
    #[serde(default)]
    pub locale: Option<String>,
}

pub fn get_config_path() -> Option<PathBuf> {
    if let Some(base_dirs) = BaseDirs::new() {
        let mut path = PathBuf::from(base_dirs.config_dir());
        path.push("feedback-collector");
        path.push("feedback-collector.toml");
        Some(path)
    } else {
        None
    }
}

pub fn load() -> Result<Settings, SettingsError> {
    if let Err(err) = dotenvy::dotenv() {
        log::debug!("no .env loaded: {err}");
    }
    let path = get_config_path();
    if let Some(path) = &path {
        log::debug!("reading settings from {}", path.display());
    }
    load_from(path.as_deref(), ENV_PREFIX)
}

pub fn load_from(path: Option<&Path>, env_prefix: &str) -> Result<Settings, SettingsError> {
    let mut builder = Config::builder().set_default("api_base", DEFAULT_API_BASE)?;
    if let Some(path) = path {
        let name = path.to_string_lossy();
        builder = builder.add_source(File::new(name.as_ref(), FileFormat::Toml).required(false));
    }
    let settings: Settings = builder
        .add_source(Environment::with_prefix(env_prefix))
        .build()?
        .try_deserialize()?;

    url::Url::parse(&settings.api_base)?;
    Ok(settings)
}
