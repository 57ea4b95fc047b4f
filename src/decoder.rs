//! Message extraction.
//!
//! Unlike embedding, extraction has no capacity to check: it walks the
//! carrier until the scheme's terminator appears. A carrier that holds no
//! terminator yields [`StegoError::NoHiddenMessage`], so "nothing hidden"
//! can never be confused with an empty message.

use std::path::Path;

use tracing::debug;

use crate::stego::{lsb, pvd, Carrier, Result, Scheme, StegoError};

/// Recovers the message hidden in `carrier` with `scheme`.
pub fn extract(carrier: &Carrier, scheme: Scheme) -> Result<String> {
    let message = match (scheme, carrier) {
        (Scheme::Lsb, carrier) => lsb::extract(carrier)?,
        (Scheme::Pvd, Carrier::Image(image)) => pvd::extract(image)?,
        (Scheme::Pvd, Carrier::Audio(_)) => {
            return Err(StegoError::UnsupportedFormat(
                "PVD extraction needs an image carrier".to_string(),
            ))
        }
    };

    debug!(%scheme, chars = message.chars().count(), "message extracted");
    Ok(message)
}

/// Loads a carrier from `path` and extracts its message.
pub fn extract_file(path: &Path, scheme: Scheme) -> Result<String> {
    let carrier = Carrier::from_file(path)?;
    extract(&carrier, scheme)
}

/// Tries every scheme in turn and returns the first that finds a message.
///
/// Useful when the scheme is unknown; note that LSB extraction on a PVD
/// artifact (or vice versa) can stumble on a terminator by chance.
pub fn extract_any(carrier: &Carrier) -> Result<(Scheme, String)> {
    for scheme in Scheme::ALL {
        match extract(carrier, scheme) {
            Ok(message) => return Ok((scheme, message)),
            Err(StegoError::NoHiddenMessage) | Err(StegoError::UnsupportedFormat(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(StegoError::NoHiddenMessage)
}
