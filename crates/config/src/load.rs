use crate::error::{ErrorKind, Result};
use crate::models::Config;
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Prefix of environment variables that override configuration values.
/// Nested keys are separated by a double underscore, so
/// `QUICKLOOK_TABLE__DELIMITER` sets `table.delimiter`.
pub const ENV_PREFIX: &str = "QUICKLOOK_";

/// Default configuration file location, per platform conventions
/// (`~/.config/quicklook/config.toml` on Linux).
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "quicklook").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Config {
    /// Load configuration: defaults, then the configuration file, then the
    /// environment.
    ///
    /// An explicit `file` must exist; the default location is only read if
    /// something is there.
    #[instrument(level = "debug")]
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(file) if !file.is_file() => exn::bail!(ErrorKind::NotFound(file.to_path_buf())),
            Some(file) => Some(file.to_path_buf()),
            None => default_path().filter(|path| path.is_file()),
        };
        let figment = Self::figment(file.as_deref())?.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    /// Defaults layered with a configuration file, by extension.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let figment = Figment::from(Serialized::defaults(Config::default()));
        let Some(file) = file else {
            return Ok(figment);
        };
        tracing::debug!(file = %file.display(), "reading configuration file");
        let extension = file.extension().and_then(|extension| extension.to_str()).map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(file)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
            Some("json") => figment.merge(Json::file_exact(file)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
        })
    }

    /// Extract and validate.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }
}
