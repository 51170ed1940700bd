use std::path::{Path, PathBuf};

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;

use crate::conversations::{ProfileFallback, UNKNOWN_NAME, UNKNOWN_ROLE};
use crate::error::CoreError;

pub const ENV_PREFIX: &str = "ALUMNI_LINK";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub database_path: PathBuf,
    pub log_dir: PathBuf,
    pub fallback_name: String,
    pub fallback_role: String,
    pub log_level: String,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/alumni-link.sqlite"),
            log_dir: PathBuf::from("data/logs"),
            fallback_name: UNKNOWN_NAME.to_string(),
            fallback_role: UNKNOWN_ROLE.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl MessagingConfig {
    /// Layers, weakest first: built-in defaults, the optional TOML file, then
    /// `ALUMNI_LINK_*` environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, CoreError> {
        let mut builder = ConfigLoader::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::from(file).required(true));
        }
        let loaded = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        Ok(loaded.try_deserialize()?)
    }

    pub fn fallback(&self) -> ProfileFallback {
        ProfileFallback {
            name: self.fallback_name.clone(),
            role: self.fallback_role.clone(),
        }
    }
}
