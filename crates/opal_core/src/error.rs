//! Error taxonomy for scene import.
//!
//! Every failure aborts the import (fail-fast); the driver wraps whatever
//! surfaced first with the file and line of the offending statement via
//! [`ImportError::At`]. Partial scene graphs are never returned as success.

use thiserror::Error;

/// Errors that can occur while importing a scene description.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("unknown texture: {0}")]
    UnknownTexture(String),

    #[error("unknown coordinate system: {0}")]
    UnknownCoordinateSystem(String),

    #[error("unknown object template: {0}")]
    UnknownTemplate(String),

    #[error("object template already defined: {0}")]
    DuplicateTemplate(String),

    #[error("ObjectBegin while template \"{0}\" is still open")]
    NestedObjectBegin(String),

    #[error("ObjectEnd without a matching ObjectBegin")]
    StrayObjectEnd,

    #[error("unbalanced end statement: graphics state stack underflow")]
    StateUnderflow,

    #[error("{closed} closes a scope opened by {opened}")]
    MismatchedScope {
        opened: &'static str,
        closed: &'static str,
    },

    #[error("unclosed scope at end of document")]
    UnclosedScope,

    #[error("singular transform: matrix is not invertible")]
    SingularTransform,

    #[error("no camera defined")]
    NoCameraDefined,

    #[error("no film defined")]
    NoFilmDefined,

    #[error("unsupported camera type: {0}")]
    UnsupportedCamera(String),

    #[error("ambiguous selection: {count} candidates for {what}")]
    AmbiguousSelection { what: &'static str, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{path}:{line}: {source}")]
    At {
        path: String,
        line: usize,
        #[source]
        source: Box<ImportError>,
    },
}

impl ImportError {
    /// Wrap an error with the document location it surfaced at.
    ///
    /// Location wrappers are applied once, at the outermost driver; an error
    /// that already carries a location is passed through unchanged.
    pub fn at(self, path: &str, line: usize) -> ImportError {
        match self {
            ImportError::At { .. } => self,
            other => ImportError::At {
                path: path.to_string(),
                line,
                source: Box::new(other),
            },
        }
    }
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
