//! Uniform least-significant-bit substitution.
//!
//! Sample `i` of the carrier's flat sequence carries bit `i` of the framed
//! message (characters MSB first, then a `00000000` terminator). Only the
//! lowest bit of each sample changes, and samples past the end of the
//! stream are left alone.

use tracing::debug;

use super::bits::{self, FrameReader, LSB_TERMINATOR};
use super::carrier::SampleCarrier;
use super::error::{Result, StegoError};

/// Hides `message` and returns the stego copy of `carrier`.
///
/// The capacity check runs before anything is copied or written, so on
/// error the caller still holds the untouched input and nothing else exists.
pub fn embed<C: SampleCarrier + Clone>(carrier: &C, message: &str) -> Result<C> {
    let stream = bits::frame(message, LSB_TERMINATOR)?;
    let capacity = carrier.flat_len();
    if stream.len() > capacity {
        return Err(StegoError::CapacityExceeded {
            needed_bits: stream.len(),
            capacity_bits: capacity,
        });
    }

    let mut stego = carrier.clone();
    for (index, &bit) in stream.iter().enumerate() {
        let sample = stego.sample(index);
        stego.set_sample(index, (sample & !1) | bit);
    }

    debug!(
        bits = stream.len(),
        capacity,
        "message embedded with LSB"
    );
    Ok(stego)
}

/// Reads the LSB of each sample until a terminator byte shows up.
///
/// Running off the end of the carrier without one is
/// [`StegoError::NoHiddenMessage`], never an empty or truncated message.
pub fn extract<C: SampleCarrier + ?Sized>(carrier: &C) -> Result<String> {
    let mut reader = FrameReader::new(LSB_TERMINATOR);
    for index in 0..carrier.flat_len() {
        if reader.push(carrier.sample(index) & 1) {
            debug!(samples_read = index + 1, "LSB terminator found");
            break;
        }
    }

    reader.into_message().ok_or(StegoError::NoHiddenMessage)
}
