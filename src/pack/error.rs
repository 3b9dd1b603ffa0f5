//! PACK error types

use thiserror::Error;

/// Broad classification of a [`PackError`], used to pick user-facing
/// messages and exit statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source is not a PACK archive
    Format,
    /// The index table ends before its declared size
    Truncated,
    /// Reading file content or writing it out failed
    Io,
    /// No such file name or position in the archive
    Lookup,
}

/// PACK reader error type
#[derive(Debug, Error)]
pub enum PackError {
    /// Wrong magic bytes at the start of the source
    #[error("header identifier incorrect - expected \"PACK\" found {found:02X?}")]
    InvalidMagic {
        /// The four bytes actually present
        found: [u8; 4],
    },

    /// Source is shorter than the fixed header
    #[error("header truncated: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },

    /// Index size is not a whole number of records
    #[error("index size {index_size} is not a multiple of the {record_size}-byte record size")]
    MisalignedIndex { index_size: u32, record_size: usize },

    /// Index table shorter than the header declares
    #[error("index truncated: record {position} of {count} ends past the end of the archive")]
    TruncatedIndex { position: usize, count: usize },

    /// Fewer bytes available than a read asked for
    #[error("error reading data for file: wanted {expected} bytes at offset {offset}, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Underlying source or sink failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Name not present in the index
    #[error("no file named {0:?} in archive")]
    NotFound(String),

    /// Name that would land outside an extraction directory
    #[error("file name {0:?} is not a safe relative path")]
    UnsafeName(String),

    /// Position outside `0..count`
    #[error("file index {index} out of range (archive holds {count} files)")]
    OutOfRange { index: usize, count: usize },
}

impl PackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PackError::InvalidMagic { .. }
            | PackError::TruncatedHeader { .. }
            | PackError::MisalignedIndex { .. } => ErrorKind::Format,
            PackError::TruncatedIndex { .. } => ErrorKind::Truncated,
            PackError::ShortRead { .. } | PackError::Io(_) => ErrorKind::Io,
            PackError::NotFound(_)
            | PackError::OutOfRange { .. }
            | PackError::UnsafeName(_) => ErrorKind::Lookup,
        }
    }
}

/// Result type for PACK operations
pub type PackResult<T> = Result<T, PackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_error_names_both_values() {
        let err = PackError::InvalidMagic { found: *b"PK\x03\x04" };
        let msg = err.to_string();
        assert!(msg.contains("\"PACK\""));
        assert!(msg.contains("[50, 4B, 03, 04]"));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn kinds_are_distinct_per_failure_class() {
        let truncated = PackError::TruncatedIndex { position: 1, count: 2 };
        let short = PackError::ShortRead { offset: 0, expected: 4, actual: 1 };
        let missing = PackError::NotFound("x".into());
        let range = PackError::OutOfRange { index: 9, count: 1 };

        assert_eq!(truncated.kind(), ErrorKind::Truncated);
        assert_eq!(short.kind(), ErrorKind::Io);
        assert_eq!(missing.kind(), ErrorKind::Lookup);
        assert_eq!(range.kind(), ErrorKind::Lookup);
    }
}
