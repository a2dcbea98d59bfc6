use crate::error::Error;
use crate::result::Result;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazy depth-first listing of the regular files below a directory.
///
/// Symlinks are followed: links to directories are descended and links to
/// files are listed as files. Broken links and link cycles are skipped with
/// a warning. Every call to [`files`] starts a fresh traversal.
pub struct Files {
    root: PathBuf,
    inner: walkdir::IntoIter,
}

pub fn files(root: &Path) -> Files {
    let inner = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    Files {
        root: root.to_path_buf(),
        inner,
    }
}

impl Iterator for Files {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => return Some(Ok(entry.into_path())),
                Ok(_) => continue,
                Err(err) => match skippable(&err) {
                    Some(reason) => {
                        log::warn!(
                            "Skipping {}: {}",
                            err.path().unwrap_or(self.root.as_path()).display(),
                            reason
                        );
                        continue;
                    }
                    None => return Some(Err(traversal_error(err))),
                },
            }
        }
    }
}

fn skippable(err: &walkdir::Error) -> Option<&'static str> {
    if err.loop_ancestor().is_some() {
        return Some("symlink cycle");
    }

    let path = err.path()?;
    let is_link = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    if is_link && fs::metadata(path).is_err() {
        return Some("broken symlink");
    }

    None
}

fn traversal_error(err: walkdir::Error) -> Error {
    match err.path().map(Path::to_path_buf) {
        Some(path) => match err.into_io_error() {
            Some(source) => Error::IoAt { path, source },
            None => Error::custom(format!("failed to walk {}", path.display())),
        },
        None => Error::WalkDir(err),
    }
}
