pub mod targz;
pub mod zipfile;

use crate::error::{Error, IoResultExt};
use crate::result::Result;
use std::collections::HashSet;
use std::fs::{self, File, Metadata};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

/// Container format of an archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
}

impl ArchiveKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::TarGz => "tar.gz",
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Format-specific half of an archive writer.
///
/// Sinks write reproducibly: entry timestamps, ownership and compression
/// headers are fixed, so packaging the same files twice yields identical bytes.
pub trait ArchiveSink {
    /// Copy the regular file at `source` into the container under `key`
    fn append(&mut self, source: &Path, key: &str, metadata: &Metadata) -> Result<()>;

    /// Write trailers and flush the container to disk
    fn finish(self: Box<Self>) -> Result<()>;
}

/// Archive under construction at `dest`.
///
/// The destination file is deleted if the writer is dropped before
/// [`ArchiveWriter::finish`] succeeds, so failed actions never leave a
/// truncated archive behind.
pub struct ArchiveWriter {
    kind: ArchiveKind,
    dest: PathBuf,
    sink: Option<Box<dyn ArchiveSink>>,
    keys: HashSet<String>,
    finished: bool,
}

impl ArchiveWriter {
    pub fn create(kind: ArchiveKind, dest: &Path) -> Result<Self> {
        let file = File::create(dest).at_path(dest)?;
        log::debug!("Creating {} archive {}", kind, dest.display());

        let sink: Box<dyn ArchiveSink> = match kind {
            ArchiveKind::Zip => Box::new(zipfile::ZipSink::new(file, dest)),
            ArchiveKind::TarGz => Box::new(targz::TarGzSink::new(file, dest)),
        };

        Ok(Self {
            kind,
            dest: dest.to_path_buf(),
            sink: Some(sink),
            keys: HashSet::new(),
            finished: false,
        })
    }

    /// Number of entries added so far
    pub fn entry_count(&self) -> usize {
        self.keys.len()
    }

    /// Add the file at `source` under the archive-internal path `key`
    pub fn add(&mut self, source: &Path, key: &str) -> Result<()> {
        validate_key(key)?;
        if self.keys.contains(key) {
            return Err(Error::DuplicateEntry(key.to_string()));
        }

        let metadata = fs::metadata(source).at_path(source)?;
        if !metadata.is_file() {
            return Err(Error::custom(format!(
                "{} is not a regular file",
                source.display()
            )));
        }

        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| Error::custom("archive writer already finished"))?;
        sink.append(source, key, &metadata)?;

        log::trace!("{} <- {}", key, source.display());
        self.keys.insert(key.to_string());
        Ok(())
    }

    /// Finalize the container and return its path
    pub fn finish(mut self) -> Result<PathBuf> {
        let sink = self
            .sink
            .take()
            .ok_or_else(|| Error::custom("archive writer already finished"))?;
        sink.finish()?;
        self.finished = true;
        log::debug!(
            "Finished {} {} with {} entries",
            self.kind,
            self.dest.display(),
            self.keys.len()
        );
        Ok(self.dest.clone())
    }
}

impl Drop for ArchiveWriter {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // Close the handle before unlinking; Windows refuses to delete open files.
        self.sink.take();
        match discard(&self.dest) {
            Ok(()) => log::debug!("Removed partial archive {}", self.dest.display()),
            Err(e) => log::warn!("Failed to remove partial archive: {}", e),
        }
    }
}

/// Remove a previously written archive; a missing file is not an error
pub fn discard(dest: &Path) -> Result<()> {
    match fs::remove_file(dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::IoAt {
            path: dest.to_path_buf(),
            source: e,
        }),
    }
}

/// Input file being copied into a sink.
///
/// Copies interleave reads from the input with writes to the archive; the
/// reader remembers whether a read failed so the error names the right file.
pub(crate) struct SourceReader<'a> {
    file: File,
    path: &'a Path,
    failed: bool,
}

impl<'a> SourceReader<'a> {
    pub fn open(path: &'a Path) -> Result<Self> {
        let file = File::open(path).at_path(path)?;
        Ok(Self {
            file,
            path,
            failed: false,
        })
    }

    /// Attribute a copy failure to the input or to the archive at `dest`
    pub fn blame(&self, source: io::Error, dest: &Path) -> Error {
        let path = if self.failed { self.path } else { dest };
        Error::IoAt {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Read for SourceReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf).inspect_err(|_| self.failed = true)
    }
}

/// Build a forward-slash archive key from a relative filesystem path
pub fn archive_key(relative: &Path) -> Result<String> {
    let invalid = || Error::InvalidArchivePath(relative.display().to_string());

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(invalid)?),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid());
            }
        }
    }

    if parts.is_empty() {
        return Err(invalid());
    }

    let key = parts.join("/");
    validate_key(&key)?;
    Ok(key)
}

/// Reject keys that are absolute, escape the archive root or are not normalized
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArchivePath(key.to_string()))
    }
}
