use crate::action::Action;
use crate::config::Config;
use crate::error::Error;
use crate::result::Result;
use std::path::PathBuf;

/// Installer generation is recognized on the command line but not
/// implemented; requesting it fails instead of silently doing nothing.
pub fn create(action: Action, config: &Config) -> Result<PathBuf> {
    log::warn!(
        "{} requested for {}; installers are not built by this tool",
        action,
        config.product
    );
    Err(Error::NotSupported(action.to_string()))
}
