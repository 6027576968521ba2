use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::environment::Environment;
use crate::shared::{SynchronizerConfig, ValidationError};

/// File extensions tried, in order, for each configuration file.
const FILE_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Stem of the file holding settings shared by all environments.
const BASE_FILE_STEM: &str = "base";

/// Prefix of environment variables overriding file settings, e.g. `APP_CLASS_NAME`.
const ENV_PREFIX: &str = "APP";

/// Separator of nested keys in environment variables, e.g. `APP_BATCH__MAX_SIZE`.
const ENV_NESTING_SEPARATOR: &str = "__";

/// Errors raised while loading a [`SynchronizerConfig`].
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("no `{stem}` configuration file (.yaml, .yml or .json) in `{}`", .directory.display())]
    MissingFile { directory: PathBuf, stem: String },

    #[error("failed to read synchronizer configuration: {0}")]
    Read(#[from] config::ConfigError),

    #[error("invalid runtime environment: {0}")]
    Environment(#[from] io::Error),

    #[error("invalid synchronizer configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Loads and validates the synchronizer configuration stored in `directory`.
///
/// The environment is taken from `APP_ENVIRONMENT`, see [`load_synchronizer_config_for`].
pub fn load_synchronizer_config(directory: &Path) -> Result<SynchronizerConfig, LoadConfigError> {
    load_synchronizer_config_for(directory, Environment::load()?)
}

/// Loads and validates the synchronizer configuration of `environment`.
///
/// Settings come from `base.*`, then `{environment}.*`, then `APP_`-prefixed environment
/// variables, each layer overriding the previous one. Both files must exist.
pub fn load_synchronizer_config_for(
    directory: &Path,
    environment: Environment,
) -> Result<SynchronizerConfig, LoadConfigError> {
    let base = locate(directory, BASE_FILE_STEM)?;
    let overrides = locate(directory, environment.as_str())?;

    let config: SynchronizerConfig = config::Config::builder()
        .add_source(config::File::from(base))
        .add_source(config::File::from(overrides))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_NESTING_SEPARATOR)
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;

    Ok(config)
}

fn locate(directory: &Path, stem: &str) -> Result<PathBuf, LoadConfigError> {
    FILE_EXTENSIONS
        .iter()
        .map(|extension| directory.join(format!("{stem}.{extension}")))
        .find(|path| path.is_file())
        .ok_or_else(|| LoadConfigError::MissingFile {
            directory: directory.to_path_buf(),
            stem: stem.to_string(),
        })
}
