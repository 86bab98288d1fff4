//! Error types for COLLADA geometry loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a COLLADA document.
#[derive(Debug, Error)]
pub enum ColladaError {
    #[error("Failed to read COLLADA file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read COLLADA data: {0}")]
    Read(#[source] std::io::Error),
    #[error("Failed to parse COLLADA XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("{kind} for geometry id={id} name={name}")]
    Geometry {
        id: String,
        name: String,
        kind: ErrorKind,
    },
}

impl ColladaError {
    /// The geometry-level failure, if this error came from one.
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            Self::Geometry { kind, .. } => Some(kind),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<ErrorCategory> {
        self.kind().map(ErrorKind::category)
    }
}

pub type ColladaResult<T> = Result<T, ColladaError>;

/// What went wrong inside a geometry.
#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("Found {found} <{element}> elements in {parent}, expected exactly one")]
    Cardinality {
        element: &'static str,
        parent: &'static str,
        found: usize,
    },
    #[error("Found unexpected {scope} input semantic '{semantic}'")]
    UnsupportedSemantic {
        scope: &'static str,
        semantic: String,
    },
    #[error(
        "Found vertex count of {vcount} in polylist; polylist vertex counts other than 3 are unsupported, triangulate the model"
    )]
    UnsupportedVertexCount { vcount: String },
    #[error("Found stride of {found} for {semantic} input, expected {expected}")]
    StrideMismatch {
        semantic: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Expected {expected} {what} but found {found}")]
    CountMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Input offsets {offsets:?} do not form the contiguous sequence 0..{}", .offsets.len())]
    OffsetMismatch { offsets: Vec<i64> },
    #[error("Unable to resolve reference '{reference}'")]
    UnresolvedReference { reference: String },
    #[error("Missing '{attribute}' attribute on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },
    #[error("Invalid {what} '{token}'")]
    InvalidNumber { what: &'static str, token: String },
    #[error("{semantic} index {index} is out of range for a source of {count} elements")]
    IndexOutOfRange {
        semantic: &'static str,
        index: usize,
        count: usize,
    },
    #[error("Vertex counter exceeded u32::MAX")]
    IndexOverflow,
    #[error("Malformed source id={id}: {kind}")]
    Source { id: String, kind: Box<ErrorKind> },
}

/// Coarse classification of [`ErrorKind`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCategory {
    Cardinality,
    UnsupportedSemantic,
    StrideMismatch,
    CountMismatch,
    OffsetMismatch,
    ReferenceResolution,
    /// Missing or unparsable attribute and data values.
    Malformed,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Source { kind, .. } => kind.category(),
            Self::Cardinality { .. } => ErrorCategory::Cardinality,
            Self::UnsupportedSemantic { .. } | Self::UnsupportedVertexCount { .. } => {
                ErrorCategory::UnsupportedSemantic
            }
            Self::StrideMismatch { .. } => ErrorCategory::StrideMismatch,
            Self::CountMismatch { .. } => ErrorCategory::CountMismatch,
            Self::OffsetMismatch { .. } => ErrorCategory::OffsetMismatch,
            Self::UnresolvedReference { .. } => ErrorCategory::ReferenceResolution,
            Self::MissingAttribute { .. }
            | Self::InvalidNumber { .. }
            | Self::IndexOutOfRange { .. }
            | Self::IndexOverflow => ErrorCategory::Malformed,
        }
    }

    /// Strip [`ErrorKind::Source`] wrappers down to the underlying failure.
    pub fn root(&self) -> &ErrorKind {
        match self {
            Self::Source { kind, .. } => kind.root(),
            other => other,
        }
    }

    pub(crate) fn in_source(self, id: &str) -> Self {
        Self::Source {
            id: id.to_owned(),
            kind: Box::new(self),
        }
    }
}
