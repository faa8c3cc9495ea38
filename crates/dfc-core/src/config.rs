//! Configuration management for dfc.
//!
//! Configuration is a single TOML file holding the default profile, slug
//! settings and any user-defined profiles. A missing file means defaults; a
//! malformed file is an error.
//!
//! ## File Location
//!
//! - `--config <PATH>` or `DFC_CONFIG` when given
//! - otherwise the platform config directory, e.g.
//!   `~/.config/dfc/config.toml` on Linux
//!
//! ## Example Configuration File
//!
//! ```toml
//! [defaults]
//! profile = "unfccc"
//!
//! [slug]
//! suffix_length = 6
//! max_attempts = 200
//! ```
//!
//! ```rust
//! use dfc_core::Config;
//!
//! let config: Config = toml::from_str("[slug]\nsuffix_length = 6\n")?;
//! assert_eq!(config.slug.suffix_length, 6);
//! assert_eq!(config.slug.max_attempts, 100);
//! assert_eq!(config.defaults.profile, "cclw");
//! # Ok::<(), toml::de::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profile::Profile;
use crate::slug::SlugSettings;
use crate::{Error, Result};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "DFC_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Defaults for command-line options.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Slug generation settings.
    #[serde(default)]
    pub slug: SlugSettings,
    /// User-defined profiles; a profile named like a built-in replaces it.
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

/// Defaults for command-line options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Profile used when `--profile` is not given.
    #[serde(default = "default_profile")]
    pub profile: String,
}

fn default_profile() -> String {
    "cclw".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
        }
    }
}

impl Config {
    /// Load from the platform config directory.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        debug!(path = %path.display(), profiles = config.profiles.len(), "loaded config");
        Ok(config)
    }

    /// Configuration file path: `DFC_CONFIG` when set, otherwise the
    /// platform config directory.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        let project_dirs = directories::ProjectDirs::from("org", "dfc", "dfc")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Check slug settings and every custom profile.
    pub fn validate(&self) -> Result<()> {
        self.slug.validate()?;
        let mut seen = std::collections::HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(Error::Config(format!(
                    "profile '{}' is defined more than once",
                    profile.name
                )));
            }
        }
        if self.profile(&self.defaults.profile).is_none() {
            return Err(Error::Config(format!(
                "default profile '{}' does not exist",
                self.defaults.profile
            )));
        }
        Ok(())
    }

    /// Every available profile: custom ones first, then built-ins they do
    /// not replace.
    #[must_use]
    pub fn profiles(&self) -> Vec<Profile> {
        let mut all = self.profiles.clone();
        all.extend(
            Profile::builtin()
                .into_iter()
                .filter(|b| !self.profiles.iter().any(|p| p.name == b.name)),
        );
        all
    }

    /// Look up a profile by name.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<Profile> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .or_else(|| Profile::builtin().into_iter().find(|p| p.name == name))
    }

    /// Whether `name` is a built-in profile that no custom profile replaces.
    #[must_use]
    pub fn is_builtin(&self, name: &str) -> bool {
        !self.profiles.iter().any(|p| p.name == name)
            && Profile::builtin().iter().any(|p| p.name == name)
    }
}
