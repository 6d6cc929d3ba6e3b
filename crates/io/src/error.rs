use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// File read/write failure.
    Io(String),
    /// Extension is neither .csv nor .json.
    UnsupportedFormat(String),
    /// File content cannot be interpreted as a collection.
    Parse { path: String, msg: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::UnsupportedFormat(path) => write!(f, "unsupported collection format: {path}"),
            Self::Parse { path, msg } => write!(f, "cannot parse {path}: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
