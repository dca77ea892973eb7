//! Unified error type for rtfcraft operations.
use crate::rtf::RtfError;
use thiserror::Error;

/// Main error type for rtfcraft operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error while writing rendered output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error raised by the RTF writer or stripper
    #[error(transparent)]
    Rtf(#[from] RtfError),
}

/// Result type for rtfcraft operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtf_error_is_transparent() {
        let err: Error = RtfError::TableFrozen.into();
        assert_eq!(err.to_string(), RtfError::TableFrozen.to_string());
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::other("disk full").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
