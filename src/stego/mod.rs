//! Steganography module for hiding text in image and audio carriers.
//!
//! Supports:
//! - Uniform LSB steganography in images (PNG, BMP, ...) and WAV audio
//! - Adaptive PVD steganography in images

pub mod audio;
pub mod bits;
pub mod capacity;
pub mod carrier;
pub mod error;
pub mod image;
pub mod lsb;
pub mod pvd;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use audio::AudioCarrier;
pub use capacity::{estimate_capacity, Capacity};
pub use carrier::{Carrier, SampleCarrier, Shape};
pub use error::{Result, StegoError};
pub use image::ImageCarrier;

/// Embedding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// One bit in the least significant bit of every sample.
    #[default]
    Lsb,
    /// Pixel-value differencing: 1 to 5 bits per pixel pair.
    Pvd,
}

impl Scheme {
    pub const ALL: [Scheme; 2] = [Scheme::Lsb, Scheme::Pvd];

    /// Byte that closes this scheme's bit-stream.
    pub fn terminator(self) -> u8 {
        match self {
            Scheme::Lsb => bits::LSB_TERMINATOR,
            Scheme::Pvd => bits::PVD_END_MARKER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Scheme::Lsb => "lsb",
            Scheme::Pvd => "pvd",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scheme {
    type Err = StegoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsb" => Ok(Scheme::Lsb),
            "pvd" => Ok(Scheme::Pvd),
            other => Err(StegoError::UnsupportedFormat(format!(
                "unknown scheme '{}' (expected lsb or pvd)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("lsb".parse::<Scheme>().unwrap(), Scheme::Lsb);
        assert_eq!(" PVD ".parse::<Scheme>().unwrap(), Scheme::Pvd);
        assert!("dct".parse::<Scheme>().is_err());

        for scheme in Scheme::ALL {
            assert_eq!(scheme.to_string().parse::<Scheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn test_terminators_differ() {
        assert_eq!(Scheme::Lsb.terminator(), 0x00);
        assert_eq!(Scheme::Pvd.terminator(), 0xFE);
    }
}
