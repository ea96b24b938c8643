//! Error types for block, undo and index decoding

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Truncated input: needed {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Expected block magic at offset {offset}, found {found:02x?}")]
    MagicMismatch { offset: usize, found: [u8; 4] },

    #[error("Amount out of range at offset {offset}: compressed value {compressed}")]
    AmountOutOfRange { offset: usize, compressed: u64 },

    #[error("Invalid block index record: expected 80 trailing header bytes, found {0}")]
    InvalidIndexRecord(usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// True when the input simply ran out, e.g. at the tail of a file still being written.
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Truncated { .. })
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
