use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid action '{0}'")]
    InvalidAction(String),

    #[error("build step `{command}` failed with exit code {code}")]
    BuildFailure {
        command: String,
        code: i32,
        output: String,
    },

    #[error("manifest entry not found: {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("install tree not found at {}. Did the build install anything?", .0.display())]
    InstallTreeMissing(PathBuf),

    #[error("invalid archive path '{0}'")]
    InvalidArchivePath(String),

    #[error("duplicate archive entry '{0}'")]
    DuplicateEntry(String),

    #[error("{0} is not supported")]
    NotSupported(String),

    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O failure on {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("zip failure on {}: {source}", path.display())]
    ZipAt {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub fn custom<T: Into<String>>(msg: T) -> Self {
        Error::Custom(msg.into())
    }
}

/// Attach the archive path to a zip error; plain I/O failures become [`Error::IoAt`]
pub fn zip_error(path: &Path) -> impl Fn(zip::result::ZipError) -> Error + '_ {
    move |err| match err {
        zip::result::ZipError::Io(source) => Error::IoAt {
            path: path.to_path_buf(),
            source,
        },
        source => Error::ZipAt {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Attach the offending path to a raw I/O error
pub trait IoResultExt<T> {
    fn at_path(self, path: &Path) -> Result<T, Error>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn at_path(self, path: &Path) -> Result<T, Error> {
        self.map_err(|source| Error::IoAt {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_carries_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result.at_path(Path::new("release/app.zip")).unwrap_err();
        assert!(err.to_string().contains("release/app.zip"));
        assert!(matches!(err, Error::IoAt { .. }));
    }

    #[test]
    fn test_zip_io_error_becomes_io_at() {
        let dest = Path::new("release/app-bin.zip");
        let err = zip_error(dest)(zip::result::ZipError::Io(io::Error::other("disk full")));
        assert!(matches!(err, Error::IoAt { ref path, .. } if path == dest));

        let err = zip_error(dest)(zip::result::ZipError::FileNotFound);
        assert!(matches!(err, Error::ZipAt { .. }));
        assert!(err.to_string().contains("release/app-bin.zip"));
    }

    #[test]
    fn test_build_failure_message() {
        let err = Error::BuildFailure {
            command: "make -j4".into(),
            code: 2,
            output: String::new(),
        };
        assert_eq!(err.to_string(), "build step `make -j4` failed with exit code 2");
    }
}
