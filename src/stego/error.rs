//! Errors produced by the steganographic codec.

use thiserror::Error;

/// Errors that can occur while estimating, embedding or extracting.
///
/// Every validation error is raised before a single sample is written, so
/// an `Err` from an embed call always means no artifact was produced.
#[derive(Error, Debug)]
pub enum StegoError {
    #[error("Carrier could not be decoded: {0}")]
    CarrierUnreadable(String),

    #[error("Message too large: need {needed_bits} bits, carrier holds {capacity_bits}")]
    CapacityExceeded {
        needed_bits: usize,
        capacity_bits: usize,
    },

    #[error("No hidden message found in carrier")]
    NoHiddenMessage,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Character {ch:?} at position {position} does not fit in one byte")]
    UnencodableChar { ch: char, position: usize },

    #[error("Byte {byte:#04x} at position {position} is reserved as the end marker")]
    ReservedByte { byte: u8, position: usize },

    #[error("Image save error: {0}")]
    ImageSaveError(String),

    #[error("Audio save error: {0}")]
    AudioSaveError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl StegoError {
    /// True for the two message-encoding failures.
    pub fn is_encoding_error(&self) -> bool {
        matches!(
            self,
            StegoError::UnencodableChar { .. } | StegoError::ReservedByte { .. }
        )
    }
}

/// Result alias used throughout the codec.
pub type Result<T> = std::result::Result<T, StegoError>;
