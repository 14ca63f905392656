//! Configuration parsing, environment overrides and validation.

pub mod env;
pub mod parser;
pub mod types;
pub mod validate;

use std::path::Path;

pub use types::*;

use crate::common::error::ConfigResult;

/// Load the config file (if present), apply environment overrides and validate.
pub fn load_and_validate(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let config = parser::load_config_or_default(path)?;
    let config = env::apply_env_overrides(config);
    validate::validate_config(&config)?;
    Ok(config)
}
