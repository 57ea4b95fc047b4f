//! Bit-stream framing for hidden messages.
//!
//! A message is a sequence of characters in the `0..=255` range. Each
//! character becomes 8 bits, most significant bit first, and the stream is
//! closed by a one-byte terminator chosen by the embedding scheme. There is
//! no length prefix.
//!
//! Bits are carried as `u8` values that are always `0` or `1`, which keeps
//! the bit-clear/OR arithmetic in the codecs free of conversions.

use super::error::{Result, StegoError};

/// Terminator closing an LSB bit-stream (`00000000`).
pub const LSB_TERMINATOR: u8 = 0x00;

/// End marker closing a PVD bit-stream (`11111110`).
pub const PVD_END_MARKER: u8 = 0xFE;

/// Converts a message to its one-byte character codes.
///
/// Fails with [`StegoError::UnencodableChar`] on the first character above
/// U+00FF.
pub fn message_bytes(message: &str) -> Result<Vec<u8>> {
    message
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            u8::try_from(ch).map_err(|_| StegoError::UnencodableChar { ch, position })
        })
        .collect()
}

/// Yields the 8 bits of `byte`, most significant first.
pub fn byte_bits(byte: u8) -> impl Iterator<Item = u8> {
    (0..8).rev().map(move |shift| (byte >> shift) & 1)
}

/// Encodes a message as bits without any terminator.
pub fn encode(message: &str) -> Result<Vec<u8>> {
    let bytes = message_bytes(message)?;
    Ok(bytes.into_iter().flat_map(byte_bits).collect())
}

/// Encodes a message and appends `terminator`.
///
/// A message that already contains the terminator byte is rejected with
/// [`StegoError::ReservedByte`]: extraction would stop there and the tail
/// would be lost.
pub fn frame(message: &str, terminator: u8) -> Result<Vec<u8>> {
    let bytes = message_bytes(message)?;
    if let Some(position) = bytes.iter().position(|&b| b == terminator) {
        return Err(StegoError::ReservedByte {
            byte: terminator,
            position,
        });
    }

    let mut bits = Vec::with_capacity(framed_len(bytes.len()));
    for byte in bytes.into_iter().chain(std::iter::once(terminator)) {
        bits.extend(byte_bits(byte));
    }
    Ok(bits)
}

/// Number of bits a framed message of `message_chars` characters occupies.
pub fn framed_len(message_chars: usize) -> usize {
    (message_chars + 1) * 8
}

/// Decodes bits back into a message.
///
/// Bits are grouped into bytes in encounter order; decoding stops at the
/// first `terminator` byte. A trailing group of fewer than 8 bits is
/// dropped.
pub fn decode(bits: &[u8], terminator: u8) -> String {
    bits.chunks_exact(8)
        .map(pack_byte)
        .take_while(|&byte| byte != terminator)
        .map(char::from)
        .collect()
}

fn pack_byte(chunk: &[u8]) -> u8 {
    chunk.iter().fold(0, |acc, &bit| (acc << 1) | (bit & 1))
}

/// Incremental decoder used by the extractors.
///
/// Bits are pushed one at a time; the reader reports when a complete
/// terminator byte has been seen so the caller can stop walking the
/// carrier.
#[derive(Debug, Clone)]
pub struct FrameReader {
    terminator: u8,
    current: u8,
    filled: u8,
    bytes: Vec<u8>,
    terminated: bool,
}

impl FrameReader {
    pub fn new(terminator: u8) -> Self {
        Self {
            terminator,
            current: 0,
            filled: 0,
            bytes: Vec::new(),
            terminated: false,
        }
    }

    /// Feeds one bit. Returns `true` once the terminator has been read;
    /// bits pushed after that are ignored.
    pub fn push(&mut self, bit: u8) -> bool {
        if self.terminated {
            return true;
        }

        self.current = (self.current << 1) | (bit & 1);
        self.filled += 1;

        if self.filled == 8 {
            if self.current == self.terminator {
                self.terminated = true;
            } else {
                self.bytes.push(self.current);
            }
            self.current = 0;
            self.filled = 0;
        }

        self.terminated
    }

    /// Feeds the low `width` bits of `value`, most significant first.
    pub fn push_value(&mut self, value: u8, width: u32) -> bool {
        for shift in (0..width).rev() {
            if self.push((value >> shift) & 1) {
                return true;
            }
        }
        self.terminated
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// The decoded message, or `None` if the terminator never arrived.
    pub fn into_message(self) -> Option<String> {
        if self.terminated {
            Some(self.bytes.into_iter().map(char::from).collect())
        } else {
            None
        }
    }
}
