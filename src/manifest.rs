use crate::archive;
use crate::error::Error;
use crate::result::Result;
use std::path::Path;

/// Ordered list of project-relative paths that make up a source release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<String>,
}

impl Manifest {
    /// Validate and normalize the given entries.
    /// Every entry must be relative and stay inside the project root.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| {
                let entry = entry.as_ref();
                archive::archive_key(Path::new(entry)).map_err(|_| {
                    Error::InvalidConfig(format!(
                        "manifest entry '{}' must be a relative path inside the project",
                        entry
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
