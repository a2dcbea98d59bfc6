use crate::context::Context;
use crate::error::{Error, IoResultExt};
use crate::manifest::Manifest;
use crate::platform::Platform;
use crate::result::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name looked up in the project root
pub const CONFIG_FILE: &str = "release.toml";

/// Configure, build and install steps used when `build` is not set
pub const DEFAULT_BUILD: [&str; 3] = ["qmake PREFIX=$PREFIX", "$MAKE -j4", "$MAKE install"];

/// Raw `release.toml` contents
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ReleaseToml {
    pub product: String,
    pub source_root: Option<String>,
    pub output_folder: Option<String>,
    pub build_dir: Option<String>,
    pub make: Option<String>,
    pub build: Option<Vec<String>>,

    #[serde(default)]
    pub sources: Vec<String>,
}

/// Parsed and resolved release configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub product: String,
    /// Top-level directory name inside source archives
    pub source_root: String,
    pub output_folder: PathBuf,
    pub build_dir: PathBuf,
    pub make: String,
    pub build_commands: Vec<String>,
    /// Directory manifest entries are relative to
    pub source_dir: PathBuf,
    pub manifest: Manifest,
}

impl Config {
    /// Load and resolve the configuration named by the context
    pub fn load(ctx: &Context) -> Result<Self> {
        if !ctx.config_path.is_file() {
            return Err(Error::ConfigNotFound(ctx.config_path.display().to_string()));
        }
        let content = fs::read_to_string(&ctx.config_path).at_path(&ctx.config_path)?;
        Self::from_toml(&content, &ctx.base_dir)
    }

    pub fn from_toml(content: &str, base_dir: &Path) -> Result<Self> {
        let raw: ReleaseToml = toml::from_str(content)?;
        Self::resolve(raw, base_dir)
    }

    fn resolve(raw: ReleaseToml, base_dir: &Path) -> Result<Self> {
        let product = raw.product.trim().to_string();
        if product.is_empty() || product.contains(['/', '\\']) {
            return Err(Error::InvalidConfig(format!(
                "product name '{}' must be a non-empty file name",
                raw.product
            )));
        }

        let source_root = raw.source_root.unwrap_or_else(|| product.clone());
        crate::archive::validate_key(&source_root).map_err(|_| {
            Error::InvalidConfig(format!("source-root '{}' is not a valid directory name", source_root))
        })?;

        let output_folder = base_dir.join(raw.output_folder.as_deref().unwrap_or("release"));
        let build_dir = base_dir.join(raw.build_dir.as_deref().unwrap_or("src"));
        let make = raw
            .make
            .unwrap_or_else(|| Platform::current().make_program().to_string());
        let build_commands = raw
            .build
            .unwrap_or_else(|| DEFAULT_BUILD.iter().map(|s| s.to_string()).collect());

        Ok(Config {
            product,
            source_root,
            output_folder,
            build_dir,
            make,
            build_commands,
            source_dir: base_dir.to_path_buf(),
            manifest: Manifest::new(&raw.sources)?,
        })
    }

    pub fn artifact_name(&self, kind: &str, extension: &str) -> String {
        format!("{}-{}.{}", self.product, kind, extension)
    }
}

/// Find the configuration file: an explicit path wins, otherwise
/// `release.toml` in the project root
pub fn find_config(base_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => base_dir.join(path),
        None => base_dir.join(CONFIG_FILE),
    }
}
