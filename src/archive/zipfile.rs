use super::{ArchiveSink, SourceReader};
use crate::error::{IoResultExt, zip_error};
use crate::result::Result;
use std::fs::{File, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Entries at or above this size need zip64 headers
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

pub struct ZipSink {
    zip: ZipWriter<File>,
    dest: PathBuf,
}

impl ZipSink {
    pub fn new(file: File, dest: &Path) -> Self {
        Self {
            zip: ZipWriter::new(file),
            dest: dest.to_path_buf(),
        }
    }
}

impl ArchiveSink for ZipSink {
    fn append(&mut self, source: &Path, key: &str, metadata: &Metadata) -> Result<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default())
            .unix_permissions(unix_mode(metadata))
            .large_file(metadata.len() >= ZIP64_THRESHOLD);

        let mut reader = SourceReader::open(source)?;
        self.zip
            .start_file(key, options)
            .map_err(zip_error(&self.dest))?;
        io::copy(&mut reader, &mut self.zip).map_err(|e| reader.blame(e, &self.dest))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let dest = self.dest;
        let mut file = self.zip.finish().map_err(zip_error(&dest))?;
        file.flush().at_path(&dest)?;
        Ok(())
    }
}

#[cfg(unix)]
fn unix_mode(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn unix_mode(_metadata: &Metadata) -> u32 {
    0o644
}
