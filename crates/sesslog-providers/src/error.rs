use std::fmt;
use std::path::{Path, PathBuf};

/// Result type for sesslog-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error classes for per-file source operations.
///
/// Callers handle these differently: a vanished file only bumps an error
/// counter during indexing, an unparseable file is worth logging, and a
/// genuine I/O failure may abort a scan.
#[derive(Debug)]
pub enum Error {
    /// IO operation failed
    Io(std::io::Error),

    /// File exists but contains no parseable records
    Parse { path: PathBuf, message: String },

    /// File vanished between discovery and processing
    NotFound(PathBuf),
}

impl Error {
    /// Classify an IO error, splitting out the vanished-file case.
    pub fn from_io(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.to_path_buf())
        } else {
            Error::Io(err)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Parse { path, message } => {
                write!(f, "Unparseable session file {}: {}", path.display(), message)
            }
            Error::NotFound(path) => write!(f, "File not found: {}", path.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Parse { .. } | Error::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
