use std::path::PathBuf;

/// Context passed throughout the application containing global configuration
#[derive(Clone)]
pub struct Context {
    /// Enable verbose output (show command execution details)
    pub verbose: bool,

    /// Path to the release configuration file
    pub config_path: PathBuf,

    /// Project root; relative configuration paths resolve against it
    pub base_dir: PathBuf,
}

impl Context {
    pub fn new(base_dir: PathBuf, config_path: PathBuf, verbose: bool) -> Self {
        Self {
            verbose,
            config_path,
            base_dir,
        }
    }
}
