//! Error types for the document layer.
//!
//! - [`DocumentError`]: a mutation that would break a document invariant
//! - [`LoadError`]: a persisted document that cannot be accepted
//!
//! Loading is all-or-nothing, so every [`LoadError`] names the shape that
//! caused the whole document to be rejected.

use thiserror::Error;

use crate::document::ShapeId;

/// A shape id made only of whitespace
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("shape id is empty")]
pub struct EmptyShapeId;

/// Invariant violations on [`crate::Document`] mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// A shape with this id is already present
    #[error("shape {id} already exists in the document")]
    DuplicateId {
        /// The id that collided.
        id: ShapeId,
    },

    /// No shape with this id exists
    #[error("shape {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: ShapeId,
    },

    /// A new z-order is not a permutation of the current shapes
    #[error("reorder does not match the document's shapes ({expected} expected, {actual} given)")]
    InvalidOrder { expected: usize, actual: usize },
}

/// Failures while loading a persisted `.abdraw` document
#[derive(Error, Debug)]
pub enum LoadError {
    /// The text is not valid JSON, a required field is missing, or a shape
    /// has an unknown type
    #[error("malformed document: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The document declares a format version this build does not read
    #[error("unsupported document version {version:?}")]
    UnsupportedVersion { version: String },

    /// Grid spacing outside the accepted range
    #[error("grid spacing {spacing} is outside {min}..={max}")]
    GridSpacing { spacing: u32, min: u32, max: u32 },

    /// A shape id that is empty or blank
    #[error("shape #{index}: invalid id {id:?}")]
    InvalidId { index: usize, id: String },

    /// Two shapes share an id
    #[error("shape #{index}: duplicate id {id}")]
    DuplicateId { index: usize, id: ShapeId },

    /// An ortho line or arrow with fewer than two waypoints
    #[error("shape #{index}: {kind} needs at least 2 waypoints, found {count}")]
    TooFewWaypoints {
        index: usize,
        kind: &'static str,
        count: usize,
    },

    /// A coordinate or size is NaN or infinite
    #[error("shape #{index}: geometry contains a non-finite value")]
    NonFinite { index: usize },

    /// An area shape with zero width or height, or a zero-length line
    #[error("shape #{index}: {kind} geometry is degenerate")]
    Degenerate { index: usize, kind: &'static str },

    /// A square or circle whose bounding box is not square
    #[error("shape #{index}: {kind} must have equal width and height (got {width} x {height})")]
    NotSquare {
        index: usize,
        kind: &'static str,
        width: f64,
        height: f64,
    },

    /// Stroke width that is not a positive finite number
    #[error("shape #{index}: invalid stroke width {width}")]
    InvalidStrokeWidth { index: usize, width: f64 },

    /// Text with a non-positive font size
    #[error("shape #{index}: invalid font size {size}")]
    InvalidFontSize { index: usize, size: f64 },

    /// A label on a shape type that cannot carry one
    #[error("shape #{index}: {kind} shapes cannot carry a label")]
    LabelNotSupported { index: usize, kind: &'static str },

    /// The validated shapes still violate a document invariant
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A connection that is not attached to a line endpoint, or whose
    /// target is missing
    #[error("shape #{index}: invalid connection to {target}: {reason}")]
    InvalidConnection {
        index: usize,
        target: ShapeId,
        reason: &'static str,
    },
}
