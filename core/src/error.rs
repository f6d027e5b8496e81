//! Error codes shared by the node hierarchy, the identity layer and the filers.

use thiserror::Error;

/// Errors that can occur while capturing, syncing or filing constrained geometry.
///
/// These are result codes: callers propagate them unchanged with `?` unless
/// they explicitly handle one.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssocError {
    /// The operation does not apply to this node or entity kind, or a
    /// persistent id is malformed.
    #[error("Bad object type: {0}")]
    BadObjType(String),

    /// A polyline segment with zero bulge cannot become an arc.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The tagged filer returned a group code other than the expected one.
    #[error("Bad DXF sequence: expected group code {expected}, found {found}")]
    BadDxfSequence { expected: i16, found: i16 },

    #[error("Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wrong object type: {0}")]
    WrongObjectType(String),

    /// A write path that is known to be unsupported.
    #[error("Not implemented yet: {0}")]
    NotImplementedYet(String),
}

impl AssocError {
    pub fn bad_obj_type(msg: impl Into<String>) -> Self {
        Self::BadObjType(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn wrong_object_type(msg: impl Into<String>) -> Self {
        Self::WrongObjectType(msg.into())
    }

    pub fn is_bad_obj_type(&self) -> bool {
        matches!(self, Self::BadObjType(_))
    }
}

/// Result type for associative geometry operations.
pub type AssocResult<T> = Result<T, AssocError>;
