use super::{ArchiveSink, SourceReader};
use crate::error::IoResultExt;
use crate::result::Result;
use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};
use std::fs::{File, Metadata};
use std::io::Write;
use std::path::{Path, PathBuf};
use tar::{Builder, Header, HeaderMode};

pub struct TarGzSink {
    tar: Builder<GzEncoder<File>>,
    dest: PathBuf,
}

impl TarGzSink {
    pub fn new(file: File, dest: &Path) -> Self {
        let encoder = GzBuilder::new()
            .mtime(0)
            .operating_system(255)
            .write(file, Compression::default());

        let mut tar = Builder::new(encoder);
        tar.mode(HeaderMode::Deterministic);

        Self {
            tar,
            dest: dest.to_path_buf(),
        }
    }
}

impl ArchiveSink for TarGzSink {
    fn append(&mut self, source: &Path, key: &str, metadata: &Metadata) -> Result<()> {
        let mut reader = SourceReader::open(source)?;
        let mut header = Header::new_gnu();
        header.set_metadata_in_mode(metadata, HeaderMode::Deterministic);
        self.tar
            .append_data(&mut header, key, &mut reader)
            .map_err(|e| reader.blame(e, &self.dest))?;
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let dest = self.dest;
        let encoder = self.tar.into_inner().at_path(&dest)?;
        let mut file = encoder.finish().at_path(&dest)?;
        file.flush().at_path(&dest)?;
        Ok(())
    }
}
