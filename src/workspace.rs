use crate::error::IoResultExt;
use crate::result::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the temporary install prefix inside the output folder
pub const INSTALL_PREFIX: &str = ".tmpdst";

/// Create a directory tree. An existing directory is fine; anything else
/// in the way, or any other OS error, is reported with the path.
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(e).at_path(path),
    }
}

/// Output folder plus the temporary install prefix the build writes into.
///
/// The prefix is removed exactly once: by [`Workspace::cleanup`], or when the
/// workspace is dropped on an early return.
pub struct Workspace {
    output_dir: PathBuf,
    prefix: PathBuf,
    cleaned: bool,
}

impl Workspace {
    /// Prepare `output_dir`. With `fresh`, a prefix left over from an
    /// interrupted run is removed so it cannot leak into the binary archives.
    pub fn acquire(output_dir: &Path, fresh: bool) -> Result<Self> {
        ensure_dir(output_dir)?;
        let prefix = output_dir.join(INSTALL_PREFIX);

        if fresh {
            remove_tree(&prefix)?;
        }

        log::debug!("Install prefix: {}", prefix.display());
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            prefix,
            cleaned: false,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Remove the install prefix. Calls after the first are no-ops.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.cleaned {
            return Ok(());
        }
        self.cleaned = true;
        log::debug!("Removing install prefix {}", self.prefix.display());
        remove_tree(&self.prefix)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::warn!("Workspace cleanup failed: {}", e);
        }
    }
}

fn remove_tree(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).at_path(path),
    }
}
