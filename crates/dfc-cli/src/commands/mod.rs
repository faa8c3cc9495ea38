//! Command implementations.

mod check;
mod events;
mod process;
mod profiles;

use std::path::Path;

use anyhow::anyhow;
use dfc_core::{Config, Profile};
use tracing::debug;

use crate::error::CliError;

pub use check::execute as check;
pub use events::execute as events;
pub use process::execute as process;
pub use profiles::execute as profiles;

/// Load configuration from `path`, or from the platform location.
pub fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// The profile named `name`, or the configured default.
pub fn resolve_profile(config: &Config, name: Option<&str>) -> Result<Profile, CliError> {
    let name = name.unwrap_or(&config.defaults.profile);
    let profile = config.profile(name).ok_or_else(|| {
        let known: Vec<String> = config.profiles().into_iter().map(|p| p.name).collect();
        CliError::not_found(anyhow!(
            "profile '{name}' not found (available: {})",
            known.join(", ")
        ))
    })?;
    debug!(profile = %profile.name, "using profile");
    Ok(profile)
}
