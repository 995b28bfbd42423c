//! Error taxonomy for the writer.
//!
//! Covers invalid input, values that don't fit their declared wire type, a
//! CFB image that outgrew the header's inline DIFAT, sink I/O failures, and
//! internal invariant violations that indicate a bug in the encoder rather
//! than bad input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MsgError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("CFB image requires {fat_sectors} FAT sectors, exceeding the {limit} the header's inline DIFAT can address without DIFAT expansion")]
    FileTooLarge { fat_sectors: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal invariant violation: {0}")]
    InternalInvariantViolation(String),
}

pub type MsgResult<T> = Result<T, MsgError>;
