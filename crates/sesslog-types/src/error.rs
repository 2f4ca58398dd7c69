use std::fmt;

/// Result type for sesslog-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A user-supplied value could not be interpreted (dates, tool names)
    InvalidInput(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
