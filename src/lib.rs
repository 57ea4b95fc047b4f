//! # bithide - hide text in images and audio
//!
//! bithide embeds a text message invisibly in a raster image or a PCM WAV
//! file and recovers it exactly.
//!
//! ## Schemes
//!
//! - **LSB**: one message bit replaces the least significant bit of every
//!   carrier sample (image channel byte or PCM sample). Works for images
//!   and audio. The message ends with a `00000000` terminator byte.
//! - **PVD**: pixel-value differencing. Each horizontal pixel pair carries
//!   1 to 5 bits depending on how different its two pixels are, so busy
//!   regions hold more. Images only. The message ends with a `11111110`
//!   end marker.
//!
//! Messages are plain one-byte characters (U+0000 to U+00FF) with no
//! encryption. Carriers must be stored losslessly (PNG, BMP, WAV);
//! recompressing a stego JPEG destroys the payload.
//!
//! ## Example Usage
//!
//! ```rust
//! use bithide::{embed, estimate_capacity, extract, Carrier, ImageCarrier, Scheme};
//!
//! let pixels = (0..64 * 64).map(|i| (i * 7 % 256) as u8).collect();
//! let carrier: Carrier = ImageCarrier::from_samples(64, 64, 1, pixels).unwrap().into();
//!
//! let capacity = estimate_capacity(&carrier, Scheme::Pvd).unwrap();
//! assert!(capacity.fits("meet at noon".len()));
//!
//! let stego = embed(&carrier, "meet at noon", Scheme::Pvd).unwrap();
//! assert_eq!(extract(&stego, Scheme::Pvd).unwrap(), "meet at noon");
//! ```
//!
//! ## Modules
//!
//! - [`stego`]: carriers, capacity estimation and the LSB/PVD codecs
//! - [`encoder`]: embedding call surface
//! - [`decoder`]: extraction call surface
//! - [`config`]: persistent CLI settings

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod stego;

// Re-export commonly used types at the crate root
pub use decoder::{extract, extract_any, extract_file};
pub use encoder::{embed, embed_file, embed_with_report, EmbeddedMessage, EncoderConfig};
pub use stego::{
    estimate_capacity, AudioCarrier, Capacity, Carrier, ImageCarrier, Result, SampleCarrier,
    Scheme, Shape, StegoError,
};
