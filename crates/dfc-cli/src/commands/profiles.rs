//! `dfc profiles`: list built-in and configured profiles.

use anyhow::Result;
use dfc_core::Config;

use crate::output::{OutputFormat, print_profiles};

/// Print every available profile.
pub fn execute(config: &Config, format: OutputFormat) -> Result<()> {
    let profiles: Vec<_> = config
        .profiles()
        .into_iter()
        .map(|p| {
            let builtin = config.is_builtin(&p.name);
            (p, builtin)
        })
        .collect();
    print_profiles(&profiles, format)
}
