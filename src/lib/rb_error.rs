use std::error::Error;
use std::fmt;
use std::io;

/// Failure of a keyed map operation. The tree is left untouched whenever one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The key argument was absent.
    NullKey,
    /// An equal key is already stored.
    DuplicateKey,
    /// No stored key compares equal to the one given.
    KeyNotFound,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::NullKey => write!(f, "key must not be null"),
            TreeError::DuplicateKey => write!(f, "key is already present in the tree"),
            TreeError::KeyNotFound => write!(f, "key not found in the tree"),
        }
    }
}

impl Error for TreeError {}

/// Failure while rendering or printing the tree.
#[derive(Debug)]
pub enum RenderError {
    /// Two nodes adjacent in key order are in none of the positions a valid tree allows.
    MalformedTree,
    /// Writing to the output sink failed.
    Io(io::Error),
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MalformedTree => write!(f, "failed filling left spacing: tree misstructured"),
            RenderError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RenderError::MalformedTree => None,
            RenderError::Io(err) => Some(err),
        }
    }
}
