//! Configuration loading for the CLI
//!
//! Sources, lowest priority first: built-in defaults, `examvoice.toml` in the
//! working directory (or the file passed with `--config`), then environment
//! variables prefixed with `EXAMVOICE_`. Nested keys use `__`, for example
//! `EXAMVOICE_FALLBACK__ENGINE=piper`.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use speech::SpeechConfig;

/// Base name of the optional configuration file
const CONFIG_FILE: &str = "examvoice";

/// Environment variable prefix
const ENV_PREFIX: &str = "EXAMVOICE";

/// Load the speech configuration
///
/// An explicit `path` must exist; the default file is optional.
pub fn load(path: Option<&Path>) -> Result<SpeechConfig, ConfigError> {
    let file = path.map_or_else(
        || File::with_name(CONFIG_FILE).required(false),
        |path| File::from(path).required(true),
    );

    Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
