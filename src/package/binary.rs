use crate::archive::{self, ArchiveKind, ArchiveWriter};
use crate::error::Error;
use crate::result::Result;
use crate::walk;
use std::path::{Path, PathBuf};

/// Archive every regular file of the install tree under its path relative
/// to the tree root
pub fn package(install_tree: &Path, kind: ArchiveKind, dest: &Path) -> Result<PathBuf> {
    if !install_tree.is_dir() {
        archive::discard(dest)?;
        return Err(Error::InstallTreeMissing(install_tree.to_path_buf()));
    }

    let mut writer = ArchiveWriter::create(kind, dest)?;
    for file in walk::files(install_tree) {
        let file = file?;
        let relative = file
            .strip_prefix(install_tree)
            .map_err(|_| Error::InvalidArchivePath(file.display().to_string()))?;
        writer.add(&file, &archive::archive_key(relative)?)?;
    }

    log::info!("Packed {} files from {}", writer.entry_count(), install_tree.display());
    writer.finish()
}
