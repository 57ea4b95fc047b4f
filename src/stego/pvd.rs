//! Adaptive Pixel-Value-Differencing substitution (images only).
//!
//! Horizontally adjacent pixel pairs are visited in the order given by
//! [`ImageCarrier::pixel_pairs`]. The absolute difference of a pair picks a
//! [`Bracket`]; a pair in a bracket of width `k` carries `k` payload bits in
//! the low `k` bits of its difference. Busy regions (large differences)
//! therefore carry more bits than smooth ones.
//!
//! The bit-stream is the message followed by the `11111110` end marker.
//! Embedding only ever moves a difference within its own bracket, so the
//! extractor, which recomputes brackets from the stego pixels, sees the
//! same widths the embedder used.

use tracing::debug;

use super::bits::{self, FrameReader, PVD_END_MARKER};
use super::capacity::{pvd_capacity, Bracket};
use super::carrier::SampleCarrier;
use super::error::{Result, StegoError};
use super::image::ImageCarrier;

/// Moves `(p1, p2)` to the closest pair whose absolute difference is
/// `new_diff`.
///
/// The change is split between both pixels, the sign of `p1 - p2` is kept,
/// and the pair is shifted back into `0..=255` when the split overflows.
pub fn adjust_pair(p1: u8, p2: u8, new_diff: u8) -> (u8, u8) {
    let (p1, p2) = (i32::from(p1), i32::from(p2));
    let delta = i32::from(new_diff) - (p1 - p2).abs();
    let floor_half = delta.div_euclid(2);
    let ceil_half = delta - floor_half;

    let (mut q1, mut q2) = if p1 >= p2 {
        (p1 + ceil_half, p2 - floor_half)
    } else {
        (p1 - floor_half, p2 + ceil_half)
    };

    let low = q1.min(q2);
    if low < 0 {
        q1 -= low;
        q2 -= low;
    }
    let high = q1.max(q2);
    if high > 255 {
        q1 -= high - 255;
        q2 -= high - 255;
    }

    (q1 as u8, q2 as u8)
}

/// Hides `message` and returns the stego copy of `image`.
///
/// Fails with [`StegoError::CapacityExceeded`] before any pixel is written
/// when the framed message needs more bits than the pairs provide.
pub fn embed(image: &ImageCarrier, message: &str) -> Result<ImageCarrier> {
    let stream = bits::frame(message, PVD_END_MARKER)?;
    let capacity = pvd_capacity(image);
    if stream.len() > capacity.bits() {
        return Err(StegoError::CapacityExceeded {
            needed_bits: stream.len(),
            capacity_bits: capacity.bits(),
        });
    }

    let mut stego = image.clone();
    let mut cursor = 0;
    let mut pairs_used = 0usize;

    for (first, second) in image.pixel_pairs() {
        if cursor >= stream.len() {
            break;
        }

        let (p1, p2) = (stego.sample(first), stego.sample(second));
        let diff = p1.abs_diff(p2);
        let bracket = Bracket::of(diff);
        let width = bracket.bits as usize;
        let take = width.min(stream.len() - cursor);

        // Past the end of the stream the pair keeps its own low bits.
        let mut value = 0u8;
        for i in 0..width {
            let bit = if i < take {
                stream[cursor + i]
            } else {
                (diff >> (width - 1 - i)) & 1
            };
            value = (value << 1) | bit;
        }
        cursor += take;

        let (q1, q2) = adjust_pair(p1, p2, bracket.nearest_with_low_bits(diff, value));
        stego.set_sample(first, q1);
        stego.set_sample(second, q2);
        pairs_used += 1;
    }

    debug!(
        bits = stream.len(),
        capacity = capacity.bits(),
        pairs_used,
        "message embedded with PVD"
    );
    Ok(stego)
}

/// Reads the low bits of each pair's difference until the end marker.
///
/// Exhausting the pairs without meeting the marker is
/// [`StegoError::NoHiddenMessage`].
pub fn extract(image: &ImageCarrier) -> Result<String> {
    let mut reader = FrameReader::new(PVD_END_MARKER);
    for (pairs_read, (first, second)) in image.pixel_pairs().enumerate() {
        let diff = image.sample(first).abs_diff(image.sample(second));
        let bracket = Bracket::of(diff);
        if reader.push_value(diff & bracket.mask(), bracket.bits) {
            debug!(pairs_read = pairs_read + 1, "PVD end marker found");
            break;
        }
    }

    reader.into_message().ok_or(StegoError::NoHiddenMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::capacity::bits_for_diff;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    fn noise_image(width: u32, height: u32, channels: u8, seed: u64) -> ImageCarrier {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let len = (width * height) as usize * channels as usize;
        let samples = (0..len).map(|_| rng.gen()).collect();
        ImageCarrier::from_samples(width, height, channels, samples).unwrap()
    }

    #[test]
    fn test_adjust_pair_example() {
        // (10, 100) stores 0110 as difference 86
        assert_eq!(adjust_pair(10, 100, 86), (12, 98));
        assert_eq!(adjust_pair(100, 10, 86), (98, 12));
        assert_eq!(adjust_pair(10, 100, 90), (10, 100));
    }

    #[test]
    fn test_adjust_pair_splits_evenly() {
        // grow by 5: 3 on one side, 2 on the other
        assert_eq!(adjust_pair(50, 40, 15), (53, 38));
        // shrink by 5
        assert_eq!(adjust_pair(50, 40, 5), (48, 43));
        assert_eq!(adjust_pair(40, 50, 5), (43, 48));
    }

    #[test]
    fn test_adjust_pair_stays_in_range() {
        assert_eq!(adjust_pair(255, 250, 20), (255, 235));
        assert_eq!(adjust_pair(0, 3, 20), (0, 20));
        assert_eq!(adjust_pair(250, 0, 255), (255, 0));

        for p1 in (0..=255u8).step_by(5) {
            for p2 in (0..=255u8).step_by(3) {
                let bracket = Bracket::of(p1.abs_diff(p2));
                for value in 0..=bracket.mask() {
                    let new_diff = bracket.nearest_with_low_bits(p1.abs_diff(p2), value);
                    let (q1, q2) = adjust_pair(p1, p2, new_diff);
                    assert_eq!(q1.abs_diff(q2), new_diff);
                    if new_diff > 0 {
                        assert_eq!(q1 >= q2, p1 >= p2);
                    }
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_gray() {
        let image = noise_image(64, 64, 1, 1);
        let message = "Pixel value differencing!";

        let stego = embed(&image, message).unwrap();
        assert_eq!(extract(&stego).unwrap(), message);
    }

    #[test]
    fn test_roundtrip_rgb() {
        let image = noise_image(48, 32, 3, 2);
        let message = "The quick brown fox jumps over the lazy dog. 0123456789";

        let stego = embed(&image, message).unwrap();
        assert_eq!(extract(&stego).unwrap(), message);
    }

    #[test]
    fn test_roundtrip_marker_like_bytes() {
        // 0xFF 0x7F and friends contain 11111110 off byte boundaries
        let image = noise_image(64, 64, 3, 3);
        let message = "\u{ff}\u{7f}\u{ff}\u{fd}abc\u{ff}";

        let stego = embed(&image, message).unwrap();
        assert_eq!(extract(&stego).unwrap(), message);
    }

    #[test]
    fn test_random_messages_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        for seed in 0..10 {
            let image = noise_image(50, 40, rng.gen_range(1..=4), seed);
            let capacity = pvd_capacity(&image);
            let len = rng.gen_range(0..capacity.message_chars().min(300));
            let message: String = (0..len)
                .map(|_| loop {
                    let byte: u8 = rng.gen();
                    if byte != PVD_END_MARKER {
                        break char::from(byte);
                    }
                })
                .collect();

            let stego = embed(&image, &message).unwrap();
            assert_eq!(extract(&stego).unwrap(), message);
        }
    }

    #[test]
    fn test_fills_capacity_exactly() {
        let image = noise_image(40, 20, 1, 4);
        let capacity = pvd_capacity(&image);
        let chars = capacity.message_chars();

        let message = "k".repeat(chars);
        let stego = embed(&image, &message).unwrap();
        assert_eq!(extract(&stego).unwrap(), message);

        let too_long = "k".repeat(chars + 1);
        assert!(matches!(
            embed(&image, &too_long),
            Err(StegoError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_brackets_survive_embedding() {
        let image = noise_image(32, 32, 3, 5);
        let stego = embed(&image, "bracket check").unwrap();

        for (first, second) in image.pixel_pairs() {
            let before = image.sample(first).abs_diff(image.sample(second));
            let after = stego.sample(first).abs_diff(stego.sample(second));
            assert_eq!(bits_for_diff(before), bits_for_diff(after));
        }
        assert_eq!(pvd_capacity(&stego), pvd_capacity(&image));
    }

    #[test]
    fn test_untouched_after_stream() {
        let image = noise_image(101, 30, 1, 6);
        let message = "tail";
        let stego = embed(&image, message).unwrap();

        let stream_len = bits::framed_len(message.len());
        let mut consumed = 0;
        for (first, second) in image.pixel_pairs() {
            if consumed >= stream_len {
                assert_eq!(image.sample(first), stego.sample(first));
                assert_eq!(image.sample(second), stego.sample(second));
            }
            consumed += bits_for_diff(image.sample(first).abs_diff(image.sample(second))) as usize;
        }

        // trailing odd column is never paired
        for row in 0..30 {
            let idx = image.index(row, 100, 0);
            assert_eq!(image.sample(idx), stego.sample(idx));
        }
    }

    #[test]
    fn test_overflow_leaves_input_untouched() {
        let image = ImageCarrier::from_samples(4, 4, 1, vec![200; 16]).unwrap();
        let before = image.clone();

        // 8 flat pairs carry 8 bits: only the marker fits
        assert_eq!(pvd_capacity(&image).bits(), 8);
        assert!(matches!(
            embed(&image, "A"),
            Err(StegoError::CapacityExceeded {
                needed_bits: 16,
                capacity_bits: 8
            })
        ));
        assert_eq!(image, before);

        let stego = embed(&image, "").unwrap();
        assert_eq!(extract(&stego).unwrap(), "");
    }

    #[test]
    fn test_flat_image_has_no_message() {
        let image = ImageCarrier::from_samples(16, 16, 3, vec![42; 16 * 16 * 3]).unwrap();
        assert!(matches!(extract(&image), Err(StegoError::NoHiddenMessage)));
    }

    #[test]
    fn test_rejects_end_marker_in_message() {
        let image = noise_image(32, 32, 1, 8);
        assert!(matches!(
            embed(&image, "caf\u{fe}"),
            Err(StegoError::ReservedByte { byte: 0xFE, position: 3 })
        ));
    }
}
