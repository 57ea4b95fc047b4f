//! Carrier abstraction shared by the codecs.
//!
//! Both media types expose the same capability set: a flat sequence of
//! addressable 8-bit samples plus a description of their shape. The LSB
//! codec is written once against [`SampleCarrier`]; [`Carrier`] is the
//! tagged variant callers load files into.

use std::io::Write;
use std::path::Path;

use image::ImageFormat;
use tempfile::NamedTempFile;

use super::audio::AudioCarrier;
use super::error::{Result, StegoError};
use super::image::ImageCarrier;

/// Audio containers that look like carriers but are compressed.
const COMPRESSED_AUDIO: &[&str] = &["mp3", "flac", "ogg", "oga", "opus", "m4a", "aac", "wma"];

/// Shape metadata of a carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Image {
        width: u32,
        height: u32,
        channels: u8,
    },
    Audio {
        channels: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        frames: usize,
    },
}

/// A flat, addressable sequence of 8-bit carrier samples.
///
/// `sample`/`set_sample` panic on an index `>= flat_len()`, like slice
/// indexing. The codecs validate lengths before touching samples.
pub trait SampleCarrier {
    /// Number of addressable samples.
    fn flat_len(&self) -> usize;

    /// Unsigned 8-bit view of sample `index`.
    fn sample(&self, index: usize) -> u8;

    /// Replaces the 8-bit view of sample `index`.
    fn set_sample(&mut self, index: usize, value: u8);

    fn shape(&self) -> Shape;
}

/// An image or audio carrier.
#[derive(Debug, Clone, PartialEq)]
pub enum Carrier {
    Image(ImageCarrier),
    Audio(AudioCarrier),
}

/// Writes an encoded artifact to `path` through a temporary file in the
/// same directory. `path` either ends up holding all of `bytes` or keeps
/// its previous content.
pub(crate) fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Returns true if `bytes` starts with a RIFF/WAVE header.
pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

impl Carrier {
    /// Loads a carrier from a file.
    ///
    /// WAV content becomes an audio carrier, everything else goes through
    /// the image decoders. Compressed audio extensions are refused up
    /// front, as is a `.wav` file without a RIFF/WAVE header.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if COMPRESSED_AUDIO.contains(&extension.as_str()) {
            return Err(StegoError::UnsupportedFormat(format!(
                "{} audio is compressed; convert it to PCM WAV first",
                extension
            )));
        }

        let bytes = std::fs::read(path)?;
        if extension == "wav" && !is_wav(&bytes) {
            return Err(StegoError::UnsupportedFormat(format!(
                "{} has no RIFF/WAVE header",
                path.display()
            )));
        }

        if is_wav(&bytes) {
            AudioCarrier::from_bytes(&bytes).map(Carrier::Audio)
        } else {
            ImageCarrier::decode(&bytes, ImageFormat::from_path(path).ok()).map(Carrier::Image)
        }
    }

    /// Loads a carrier from encoded bytes, sniffing for a WAV header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if is_wav(bytes) {
            AudioCarrier::from_bytes(bytes).map(Carrier::Audio)
        } else {
            ImageCarrier::from_bytes(bytes).map(Carrier::Image)
        }
    }

    /// Writes the carrier to `path` (images: format from the extension).
    pub fn save<P: AsRef<Path>>(&self, path: P, allow_lossy: bool) -> Result<()> {
        match self {
            Carrier::Image(image) => image.save(path, allow_lossy),
            Carrier::Audio(audio) => audio.save(path),
        }
    }

    /// Encodes the carrier as PNG (images) or WAV (audio) bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Carrier::Image(image) => image.to_png_bytes(),
            Carrier::Audio(audio) => audio.to_wav_bytes(),
        }
    }

    /// Conventional file extension for [`Carrier::to_bytes`] output.
    pub fn default_extension(&self) -> &'static str {
        match self {
            Carrier::Image(_) => "png",
            Carrier::Audio(_) => "wav",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Carrier::Image(_))
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Carrier::Audio(_))
    }

    pub fn as_image(&self) -> Option<&ImageCarrier> {
        match self {
            Carrier::Image(image) => Some(image),
            Carrier::Audio(_) => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioCarrier> {
        match self {
            Carrier::Audio(audio) => Some(audio),
            Carrier::Image(_) => None,
        }
    }
}

impl From<ImageCarrier> for Carrier {
    fn from(image: ImageCarrier) -> Self {
        Carrier::Image(image)
    }
}

impl From<AudioCarrier> for Carrier {
    fn from(audio: AudioCarrier) -> Self {
        Carrier::Audio(audio)
    }
}

impl SampleCarrier for Carrier {
    fn flat_len(&self) -> usize {
        match self {
            Carrier::Image(image) => image.flat_len(),
            Carrier::Audio(audio) => audio.flat_len(),
        }
    }

    fn sample(&self, index: usize) -> u8 {
        match self {
            Carrier::Image(image) => image.sample(index),
            Carrier::Audio(audio) => audio.sample(index),
        }
    }

    fn set_sample(&mut self, index: usize, value: u8) {
        match self {
            Carrier::Image(image) => image.set_sample(index, value),
            Carrier::Audio(audio) => audio.set_sample(index, value),
        }
    }

    fn shape(&self) -> Shape {
        match self {
            Carrier::Image(image) => image.shape(),
            Carrier::Audio(audio) => audio.shape(),
        }
    }
}
