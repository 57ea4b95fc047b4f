//! Message embedding.
//!
//! This module orchestrates the embedding process:
//! 1. Validate the message (one-byte characters, no terminator byte)
//! 2. Estimate the carrier's capacity for the chosen scheme
//! 3. Write the framed bit-stream into a copy of the carrier
//! 4. Optionally save the stego artifact
//!
//! Every check happens before a sample is touched, so a failed call never
//! leaves a partial artifact behind.

use std::path::Path;

use tracing::{debug, info};

use crate::stego::bits::framed_len;
use crate::stego::{
    estimate_capacity, lsb, pvd, Capacity, Carrier, Result, Scheme, StegoError,
};

/// Configuration for the encoder.
#[derive(Debug, Clone, Default)]
pub struct EncoderConfig {
    /// Embedding scheme.
    pub scheme: Scheme,
    /// Allow writing image artifacts in lossy formats.
    pub allow_lossy: bool,
}

impl EncoderConfig {
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }
}

/// Result of embedding a message.
#[derive(Debug, Clone)]
pub struct EmbeddedMessage {
    /// The stego artifact (same shape and metadata as the input).
    pub artifact: Carrier,
    /// Capacity of the input carrier under the scheme used.
    pub capacity: Capacity,
    /// Bits written, terminator included.
    pub bits_used: usize,
}

/// Hides `message` in `carrier` with `scheme` and returns the stego copy.
pub fn embed(carrier: &Carrier, message: &str, scheme: Scheme) -> Result<Carrier> {
    match (scheme, carrier) {
        (Scheme::Lsb, carrier) => lsb::embed(carrier, message),
        (Scheme::Pvd, Carrier::Image(image)) => pvd::embed(image, message).map(Carrier::Image),
        (Scheme::Pvd, Carrier::Audio(_)) => Err(StegoError::UnsupportedFormat(
            "PVD embedding needs an image carrier".to_string(),
        )),
    }
}

/// Like [`embed`], but also reports capacity and usage.
pub fn embed_with_report(
    carrier: &Carrier,
    message: &str,
    scheme: Scheme,
) -> Result<EmbeddedMessage> {
    let capacity = estimate_capacity(carrier, scheme)?;
    let artifact = embed(carrier, message, scheme)?;
    let bits_used = framed_len(message.chars().count());

    debug!(%scheme, bits_used, capacity = capacity.bits(), "embed complete");

    Ok(EmbeddedMessage {
        artifact,
        capacity,
        bits_used,
    })
}

/// Loads `input`, hides `message` and writes the artifact to `output`.
pub fn embed_file(
    input: &Path,
    output: &Path,
    message: &str,
    config: &EncoderConfig,
) -> Result<EmbeddedMessage> {
    let carrier = Carrier::from_file(input)?;
    let embedded = embed_with_report(&carrier, message, config.scheme)?;
    embedded.artifact.save(output, config.allow_lossy)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        scheme = %config.scheme,
        "stego artifact written"
    );
    Ok(embedded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::ImageCarrier;

    fn gradient_carrier() -> Carrier {
        let samples = (0..32 * 32 * 3).map(|i| ((i * 37) % 251) as u8).collect();
        ImageCarrier::from_samples(32, 32, 3, samples).unwrap().into()
    }

    #[test]
    fn test_embed_dispatches_by_scheme() {
        let carrier = gradient_carrier();
        for scheme in Scheme::ALL {
            let stego = embed(&carrier, "dispatch", scheme).unwrap();
            assert_eq!(crate::decoder::extract(&stego, scheme).unwrap(), "dispatch");
        }
    }

    #[test]
    fn test_report() {
        let carrier = gradient_carrier();
        let report = embed_with_report(&carrier, "abc", Scheme::Lsb).unwrap();
        assert_eq!(report.bits_used, 32);
        assert_eq!(report.capacity.bits(), 32 * 32 * 3);
    }

    #[test]
    fn test_pvd_on_audio_is_unsupported() {
        let audio = Carrier::Audio(crate::stego::audio::create_test_audio(1000, 16));
        assert!(matches!(
            embed(&audio, "x", Scheme::Pvd),
            Err(StegoError::UnsupportedFormat(_))
        ));
    }
}
