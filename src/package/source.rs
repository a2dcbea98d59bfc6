use crate::archive::{self, ArchiveKind, ArchiveWriter};
use crate::error::{Error, IoResultExt};
use crate::manifest::Manifest;
use crate::result::Result;
use crate::walk;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Packs the files named by a manifest under a fixed top-level directory
pub struct SourcePackager {
    manifest: Manifest,
    source_dir: PathBuf,
    root_name: String,
}

impl SourcePackager {
    pub fn new(manifest: Manifest, source_dir: &Path, root_name: &str) -> Result<Self> {
        archive::validate_key(root_name)?;
        Ok(Self {
            manifest,
            source_dir: source_dir.to_path_buf(),
            root_name: root_name.to_string(),
        })
    }

    /// Resolve every manifest entry to (file on disk, archive key), expanding
    /// directories. Fails on the first entry that does not exist.
    pub fn files(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut files = Vec::new();
        for entry in self.manifest.entries() {
            let path = self.source_dir.join(entry);
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
                    ) =>
                {
                    return Err(Error::ManifestMissing(PathBuf::from(entry)));
                }
                Err(e) => return Err(e).at_path(&path),
            };

            if metadata.is_dir() {
                for file in walk::files(&path) {
                    let file = file?;
                    let relative = file
                        .strip_prefix(&self.source_dir)
                        .map_err(|_| Error::InvalidArchivePath(file.display().to_string()))?;
                    let key = self.key(relative)?;
                    files.push((file, key));
                }
            } else {
                let key = self.key(Path::new(entry))?;
                files.push((path, key));
            }
        }
        Ok(files)
    }

    /// Write the source archive to `dest`. Nothing is left at `dest` when a
    /// manifest entry is missing or any file fails to pack, including an
    /// archive from an earlier run.
    pub fn package(&self, kind: ArchiveKind, dest: &Path) -> Result<PathBuf> {
        let files = match self.files() {
            Ok(files) => files,
            Err(e) => {
                archive::discard(dest)?;
                return Err(e);
            }
        };

        let mut writer = ArchiveWriter::create(kind, dest)?;
        for (file, key) in &files {
            writer.add(file, key)?;
        }

        log::info!(
            "Packed {} files from {} manifest entries into {}",
            writer.entry_count(),
            self.manifest.len(),
            dest.display()
        );
        writer.finish()
    }

    fn key(&self, relative: &Path) -> Result<String> {
        Ok(format!("{}/{}", self.root_name, archive::archive_key(relative)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::testing::{read_tar_gz, read_zip};
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn project(tmp: &TempDir) -> PathBuf {
        let root = tmp.path().join("project");
        fs::create_dir_all(root.join("dir")).unwrap();
        fs::create_dir_all(root.join("lua/sub")).unwrap();
        fs::write(root.join("a.txt"), "alpha").unwrap();
        fs::write(root.join("dir/b.txt"), "beta").unwrap();
        fs::write(root.join("dir/unlisted.txt"), "nope").unwrap();
        fs::write(root.join("lua/lapi.c"), "lapi").unwrap();
        fs::write(root.join("lua/sub/x.h"), "x").unwrap();
        root
    }

    #[test]
    fn test_source_zip_contains_exactly_the_manifest() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let manifest = Manifest::new(["a.txt", "dir/b.txt"]).unwrap();
        let dest = tmp.path().join("proj-src.zip");

        SourcePackager::new(manifest, &root, "proj")
            .unwrap()
            .package(ArchiveKind::Zip, &dest)
            .unwrap();

        let entries = read_zip(&dest);
        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(keys, ["proj/a.txt", "proj/dir/b.txt"]);
        assert_eq!(entries["proj/a.txt"], b"alpha");
        assert_eq!(entries["proj/dir/b.txt"], b"beta");
    }

    #[test]
    fn test_directory_entries_expand() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let manifest = Manifest::new(["lua", "a.txt"]).unwrap();
        let dest = tmp.path().join("proj-src.tar.gz");

        SourcePackager::new(manifest, &root, "proj")
            .unwrap()
            .package(ArchiveKind::TarGz, &dest)
            .unwrap();

        let keys: BTreeSet<String> = read_tar_gz(&dest).into_keys().collect();
        let expected: BTreeSet<String> = ["proj/a.txt", "proj/lua/lapi.c", "proj/lua/sub/x.h"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_manifest_order_is_kept() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let manifest = Manifest::new(["dir/b.txt", "a.txt"]).unwrap();
        let packager = SourcePackager::new(manifest, &root, "proj").unwrap();

        let keys: Vec<String> = packager.files().unwrap().into_iter().map(|(_, k)| k).collect();
        assert_eq!(keys, ["proj/dir/b.txt", "proj/a.txt"]);
    }

    #[test]
    fn test_missing_entry_leaves_no_archive() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let manifest = Manifest::new(["a.txt", "gone.txt"]).unwrap();
        let packager = SourcePackager::new(manifest, &root, "proj").unwrap();

        for kind in [ArchiveKind::Zip, ArchiveKind::TarGz] {
            let dest = tmp.path().join(format!("proj-src.{}", kind.extension()));
            let err = packager.package(kind, &dest).unwrap_err();
            assert!(matches!(err, Error::ManifestMissing(ref p) if p == Path::new("gone.txt")));
            assert!(!dest.exists());
        }
    }

    #[test]
    fn test_failed_run_removes_previous_archive() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let packager =
            SourcePackager::new(Manifest::new(["a.txt", "dir/b.txt"]).unwrap(), &root, "proj")
                .unwrap();

        for kind in [ArchiveKind::Zip, ArchiveKind::TarGz] {
            let dest = tmp.path().join(format!("proj-src.{}", kind.extension()));
            fs::write(root.join("dir/b.txt"), "beta").unwrap();
            packager.package(kind, &dest).unwrap();
            assert!(dest.is_file());

            fs::remove_file(root.join("dir/b.txt")).unwrap();
            let err = packager.package(kind, &dest).unwrap_err();
            assert!(matches!(err, Error::ManifestMissing(ref p) if p == Path::new("dir/b.txt")));
            assert!(!dest.exists(), "{kind} archive from the first run survived");
        }
    }

    #[test]
    fn test_entry_below_a_file_is_missing() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let manifest = Manifest::new(["a.txt/x"]).unwrap();
        let dest = tmp.path().join("proj-src.zip");

        let err = SourcePackager::new(manifest, &root, "proj")
            .unwrap()
            .package(ArchiveKind::Zip, &dest)
            .unwrap_err();
        assert!(matches!(err, Error::ManifestMissing(ref p) if p == Path::new("a.txt/x")));
        assert!(!dest.exists());
    }

    #[test]
    fn test_overlapping_entries_fail_without_output() {
        let tmp = TempDir::new().unwrap();
        let root = project(&tmp);
        let manifest = Manifest::new(["lua", "lua/lapi.c"]).unwrap();
        let dest = tmp.path().join("proj-src.zip");

        let err = SourcePackager::new(manifest, &root, "proj")
            .unwrap()
            .package(ArchiveKind::Zip, &dest)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEntry(ref k) if k == "proj/lua/lapi.c"));
        assert!(!dest.exists());
    }

    #[test]
    fn test_invalid_root_name() {
        let tmp = TempDir::new().unwrap();
        assert!(SourcePackager::new(Manifest::default(), tmp.path(), "../x").is_err());
    }
}
