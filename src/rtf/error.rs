//! Error types for RTF composition and stripping.

use thiserror::Error;

/// Result type for RTF operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// RTF composition and stripping errors.
///
/// All of these describe programmer errors (bad indices, conflicting
/// geometry, unsupported properties). None of them is transient.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RtfError {
    /// Character range outside the paragraph text
    #[error("Invalid character range {begin}..={end} for text of length {len}")]
    InvalidRange { begin: usize, end: usize, len: usize },

    /// Row or column index outside the table grid
    #[error("Invalid cell index ({row}, {col})")]
    InvalidCellIndex { row: usize, col: usize },

    /// Merge span that does not fit the table grid
    #[error("Invalid merge span of {row_span}x{col_span} at ({row}, {col})")]
    InvalidSpan {
        row: usize,
        col: usize,
        row_span: usize,
        col_span: usize,
    },

    /// Cell already belongs to another merged region
    #[error("Cell ({row}, {col}) is already part of a merged region")]
    AlreadyMerged { row: usize, col: usize },

    /// Width/height change that would break a merged region
    #[error("Geometry conflict: {0}")]
    GeometryConflict(String),

    /// Staging call after the table grid was fixed
    #[error("Table geometry is frozen; rows and columns can no longer be staged")]
    TableFrozen,

    /// Property not supported by this kind of block
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Content not allowed in this container
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// Hyperlink with neither display text nor target
    #[error("Hyperlink has no display text and no target")]
    EmptyHyperlink,

    /// Image bytes in an unrecognised format
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// Stripper was handed nothing to decode
    #[error("Empty RTF input")]
    EmptyInput,
}
