//! Capacity estimation.
//!
//! Estimates never touch the carrier. Each figure is exact for its scheme:
//! a message fits if and only if its framed bit-stream (characters plus the
//! one-byte terminator) is no longer than [`Capacity::bits`].

use tracing::debug;

use super::bits::framed_len;
use super::carrier::{Carrier, SampleCarrier};
use super::error::{Result, StegoError};
use super::image::ImageCarrier;
use super::Scheme;

/// A PVD difference bracket.
///
/// Bracket lower bounds are multiples of `2^bits`, so every `bits`-wide
/// value has a representative difference inside the bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    /// Smallest difference in the bracket.
    pub lower: u8,
    /// Largest difference in the bracket (inclusive).
    pub upper: u8,
    /// Payload bits carried by a pair in this bracket.
    pub bits: u32,
}

impl Bracket {
    /// Looks up the bracket of an absolute pixel difference.
    pub fn of(diff: u8) -> Self {
        let (lower, upper, bits) = match diff {
            0..=15 => (0, 15, 1),
            16..=31 => (16, 31, 2),
            32..=63 => (32, 63, 3),
            64..=127 => (64, 127, 4),
            _ => (128, 255, 5),
        };
        Self { lower, upper, bits }
    }

    /// Mask selecting the payload bits of a difference.
    pub fn mask(&self) -> u8 {
        ((1u16 << self.bits) - 1) as u8
    }

    /// The difference inside this bracket whose low `bits` bits equal
    /// `value` and which lies closest to `diff`.
    pub fn nearest_with_low_bits(&self, diff: u8, value: u8) -> u8 {
        let step = 1i32 << self.bits;
        let lower = i32::from(self.lower);
        let size = i32::from(self.upper) - lower + 1;
        let offset = i32::from(diff) - lower;

        let base = (offset & !(step - 1)) + i32::from(value & self.mask());
        let best = [base - step, base + step]
            .into_iter()
            .filter(|candidate| (0..size).contains(candidate))
            .fold(base, |best, candidate| {
                if (candidate - offset).abs() < (best - offset).abs() {
                    candidate
                } else {
                    best
                }
            });

        (best + lower) as u8
    }
}

/// Number of payload bits a pixel pair with difference `diff` carries.
pub fn bits_for_diff(diff: u8) -> u32 {
    Bracket::of(diff).bits
}

/// Payload capacity of a carrier under one scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Capacity {
    bits: usize,
}

impl Capacity {
    pub fn from_bits(bits: usize) -> Self {
        Self { bits }
    }

    /// Total payload bits, terminator included.
    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Total payload bytes, terminator included.
    pub fn bytes(&self) -> usize {
        self.bits / 8
    }

    /// Longest message (in one-byte characters) that fits next to the
    /// terminator.
    pub fn message_chars(&self) -> usize {
        self.bytes().saturating_sub(1)
    }

    /// Whether a message of `message_chars` characters fits.
    pub fn fits(&self, message_chars: usize) -> bool {
        framed_len(message_chars) <= self.bits
    }
}

/// Uniform LSB: one bit per carrier sample.
///
/// For audio every interleaved PCM sample counts, so a stereo stream reports
/// two bits per frame.
pub fn lsb_capacity<C: SampleCarrier + ?Sized>(carrier: &C) -> Capacity {
    Capacity::from_bits(carrier.flat_len())
}

/// Adaptive PVD: the sum of the per-pair bracket widths.
pub fn pvd_capacity(image: &ImageCarrier) -> Capacity {
    let bits: usize = image
        .pixel_pairs()
        .map(|(first, second)| {
            let diff = image.samples()[first].abs_diff(image.samples()[second]);
            bits_for_diff(diff) as usize
        })
        .sum();
    Capacity::from_bits(bits)
}

/// Estimates how much `scheme` can hide in `carrier`.
///
/// Audio figures are per PCM sample, not per frame (see [`lsb_capacity`]).
///
/// PVD is only defined for images; asking for it on audio fails with
/// [`StegoError::UnsupportedFormat`].
pub fn estimate_capacity(carrier: &Carrier, scheme: Scheme) -> Result<Capacity> {
    let capacity = match (scheme, carrier) {
        (Scheme::Lsb, carrier) => lsb_capacity(carrier),
        (Scheme::Pvd, Carrier::Image(image)) => pvd_capacity(image),
        (Scheme::Pvd, Carrier::Audio(_)) => {
            return Err(StegoError::UnsupportedFormat(
                "PVD embedding needs an image carrier".to_string(),
            ))
        }
    };

    debug!(%scheme, bits = capacity.bits(), "capacity estimated");
    Ok(capacity)
}
