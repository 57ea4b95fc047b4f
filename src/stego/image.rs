//! Image carriers.
//!
//! Holds an image as a flat buffer of 8-bit samples in row-major,
//! channel-minor order: sample `(row, col, channel)` lives at
//! `(row * width + col) * channels + channel`.
//!
//! Supported layouts are L8, La8, Rgb8 and Rgba8. Any channel, alpha
//! included, is a carrier sample. Only lossless formats (PNG, BMP, TIFF,
//! TGA, PNM, QOI) survive a round trip, and not every one of them can hold
//! every layout: BMP stores grayscale as RGB, for instance. Saving checks
//! the encoded file decodes back to the same samples. JPEG and other lossy
//! inputs are accepted for reading but recompressing the output destroys
//! the payload.

use image::{
    DynamicImage, ImageBuffer, ImageError, ImageFormat, ImageReader, Luma, LumaA, Rgb, Rgba,
};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

use super::carrier::{write_artifact, SampleCarrier, Shape};
use super::error::{Result, StegoError};

/// Returns true if `format` stores 8-bit samples without loss.
pub fn is_lossless_format(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::Tga
            | ImageFormat::Pnm
            | ImageFormat::Qoi
    )
}

fn encode_error(err: ImageError) -> StegoError {
    match err {
        ImageError::Unsupported(e) => StegoError::UnsupportedFormat(e.to_string()),
        other => StegoError::ImageSaveError(other.to_string()),
    }
}

/// An 8-bit image carrier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCarrier {
    width: u32,
    height: u32,
    channels: u8,
    samples: Vec<u8>,
    source_format: Option<ImageFormat>,
}

impl ImageCarrier {
    /// Loads an image carrier from a file path.
    ///
    /// The extension is used as a format hint for formats without magic
    /// bytes (TGA).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes, ImageFormat::from_path(path).ok())
    }

    /// Loads an image carrier from encoded bytes (PNG, BMP, JPEG, ...).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::decode(bytes, None)
    }

    /// Decodes `bytes`. A format recognised from the content wins over `hint`.
    pub(crate) fn decode(bytes: &[u8], hint: Option<ImageFormat>) -> Result<Self> {
        let mut reader = ImageReader::new(Cursor::new(bytes));
        if let Some(format) = hint {
            reader.set_format(format);
        }
        let reader = reader
            .with_guessed_format()
            .map_err(|e| StegoError::CarrierUnreadable(e.to_string()))?;
        let format = reader.format();
        let image = reader
            .decode()
            .map_err(|e| StegoError::CarrierUnreadable(e.to_string()))?;

        if let Some(format) = format {
            if !is_lossless_format(format) {
                warn!(
                    ?format,
                    "carrier comes from a lossy format; the payload only survives lossless storage"
                );
            }
        }

        let mut carrier = Self::from_image(image)?;
        carrier.source_format = format;
        Ok(carrier)
    }

    /// Wraps a decoded image. Fails for anything but 8-bit layouts.
    pub fn from_image(image: DynamicImage) -> Result<Self> {
        let channels = match &image {
            DynamicImage::ImageLuma8(_) => 1,
            DynamicImage::ImageLumaA8(_) => 2,
            DynamicImage::ImageRgb8(_) => 3,
            DynamicImage::ImageRgba8(_) => 4,
            other => {
                return Err(StegoError::UnsupportedFormat(format!(
                    "only 8-bit image samples are supported, got {:?}",
                    other.color()
                )))
            }
        };
        let (width, height) = (image.width(), image.height());

        debug!(width, height, channels, "image carrier loaded");

        Ok(Self {
            width,
            height,
            channels,
            samples: image.into_bytes(),
            source_format: None,
        })
    }

    /// Builds a carrier from a raw `height x width x channels` sample grid.
    pub fn from_samples(width: u32, height: u32, channels: u8, samples: Vec<u8>) -> Result<Self> {
        if !(1..=4).contains(&channels) {
            return Err(StegoError::UnsupportedFormat(format!(
                "{} channels per pixel",
                channels
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if samples.len() != expected {
            return Err(StegoError::CarrierUnreadable(format!(
                "{}x{}x{} grid needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                samples.len()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
            samples,
            source_format: None,
        })
    }

    /// Converts the carrier back into a `DynamicImage` of the same layout.
    pub fn to_image(&self) -> Result<DynamicImage> {
        let (w, h) = (self.width, self.height);
        let buf = self.samples.clone();
        let image = match self.channels {
            1 => ImageBuffer::<Luma<u8>, _>::from_raw(w, h, buf).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, buf).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, buf).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, buf).map(DynamicImage::ImageRgba8),
            _ => None,
        };
        image.ok_or_else(|| {
            StegoError::ImageSaveError("sample buffer does not match image dimensions".to_string())
        })
    }

    /// Saves the image, picking the format from the file extension.
    ///
    /// See [`ImageCarrier::encode`] for the formats that are accepted. The
    /// file is replaced in one step, so a failed save leaves `path` as it was.
    pub fn save<P: AsRef<Path>>(&self, path: P, allow_lossy: bool) -> Result<()> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path)
            .map_err(|e| StegoError::UnsupportedFormat(e.to_string()))?;

        let bytes = self.encode(format, allow_lossy)?;
        write_artifact(path, &bytes)?;

        debug!(?format, path = %path.display(), bytes = bytes.len(), "image carrier saved");
        Ok(())
    }

    /// Encodes the image in `format`.
    ///
    /// Lossy formats are refused unless `allow_lossy` is set. Lossless output
    /// is decoded again and must give back exactly this carrier; a format that
    /// would change the layout fails with [`StegoError::UnsupportedFormat`].
    pub fn encode(&self, format: ImageFormat, allow_lossy: bool) -> Result<Vec<u8>> {
        let lossless = is_lossless_format(format);
        if !lossless {
            if !allow_lossy {
                return Err(StegoError::UnsupportedFormat(format!(
                    "{:?} is lossy and would destroy the hidden message; use PNG or BMP",
                    format
                )));
            }
            warn!(?format, "encoding stego image in a lossy format");
        }

        let mut bytes = Vec::new();
        self.to_image()?
            .write_to(&mut Cursor::new(&mut bytes), format)
            .map_err(encode_error)?;

        if lossless {
            self.check_reload(&bytes, format)?;
        }
        Ok(bytes)
    }

    /// Fails unless `bytes` decode to the same layout and samples.
    fn check_reload(&self, bytes: &[u8], format: ImageFormat) -> Result<()> {
        let changed = || {
            StegoError::UnsupportedFormat(format!(
                "{:?} cannot store this {}-channel image unchanged; use PNG",
                format, self.channels
            ))
        };

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| StegoError::ImageSaveError(e.to_string()))?;
        let reloaded = Self::from_image(decoded).map_err(|_| changed())?;

        if reloaded.dimensions() != self.dimensions()
            || reloaded.channels != self.channels
            || reloaded.samples != self.samples
        {
            return Err(changed());
        }
        Ok(())
    }

    /// Returns the image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        self.encode(ImageFormat::Png, false)
    }

    /// Width and height in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Format the carrier was decoded from, if it came from encoded bytes.
    pub fn source_format(&self) -> Option<ImageFormat> {
        self.source_format
    }

    pub fn is_lossy_source(&self) -> bool {
        self.source_format
            .map(|format| !is_lossless_format(format))
            .unwrap_or(false)
    }

    /// Flat index of a sample.
    pub fn index(&self, row: u32, col: u32, channel: u8) -> usize {
        (row as usize * self.width as usize + col as usize) * self.channels as usize
            + channel as usize
    }

    /// Horizontally adjacent sample pairs as flat indices.
    ///
    /// Rows are walked top to bottom, pixels are paired `(0,1), (2,3), ...`
    /// within a row (a trailing odd pixel is never paired) and each pair
    /// yields one entry per channel.
    pub fn pixel_pairs(&self) -> impl Iterator<Item = (usize, usize)> {
        let width = self.width as usize;
        let channels = self.channels as usize;
        (0..self.height as usize).flat_map(move |row| {
            (0..width / 2).flat_map(move |pair| {
                let base = (row * width + pair * 2) * channels;
                (0..channels).map(move |ch| (base + ch, base + channels + ch))
            })
        })
    }
}

impl SampleCarrier for ImageCarrier {
    fn flat_len(&self) -> usize {
        self.samples.len()
    }

    fn sample(&self, index: usize) -> u8 {
        self.samples[index]
    }

    fn set_sample(&mut self, index: usize, value: u8) {
        self.samples[index] = value;
    }

    fn shape(&self) -> Shape {
        Shape::Image {
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_test_image(width: u32, height: u32) -> DynamicImage {
        let img = ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                ((x * 17) % 256) as u8,
                ((y * 23) % 256) as u8,
                (((x + y) * 31) % 256) as u8,
            ])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_layout_is_row_major_channel_minor() {
        let carrier = ImageCarrier::from_image(create_test_image(5, 3)).unwrap();
        assert_eq!(carrier.flat_len(), 5 * 3 * 3);
        assert_eq!(
            carrier.shape(),
            Shape::Image {
                width: 5,
                height: 3,
                channels: 3
            }
        );

        // pixel (x=4, y=2), green channel
        let idx = carrier.index(2, 4, 1);
        assert_eq!(idx, (2 * 5 + 4) * 3 + 1);
        assert_eq!(carrier.sample(idx), ((2 * 23) % 256) as u8);
    }

    #[test]
    fn test_channel_counts() {
        let gray = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(4, 4, Luma([7u8])));
        assert_eq!(ImageCarrier::from_image(gray).unwrap().channels(), 1);

        let rgba = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(2, 2, Rgba([1, 2, 3, 4])));
        let carrier = ImageCarrier::from_image(rgba).unwrap();
        assert_eq!(carrier.channels(), 4);
        assert_eq!(carrier.samples(), &[1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rejects_16_bit_images() {
        let deep = DynamicImage::ImageLuma16(ImageBuffer::from_pixel(4, 4, Luma([1000u16])));
        let result = ImageCarrier::from_image(deep);
        assert!(matches!(result, Err(StegoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_from_samples_validates_length() {
        assert!(ImageCarrier::from_samples(4, 4, 1, vec![0; 16]).is_ok());
        assert!(matches!(
            ImageCarrier::from_samples(4, 4, 1, vec![0; 15]),
            Err(StegoError::CarrierUnreadable(_))
        ));
        assert!(matches!(
            ImageCarrier::from_samples(1, 1, 5, vec![0; 5]),
            Err(StegoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_pixel_pairs_skip_trailing_column() {
        let carrier = ImageCarrier::from_samples(5, 2, 1, (0..10).collect()).unwrap();
        let pairs: Vec<_> = carrier.pixel_pairs().collect();
        assert_eq!(pairs, vec![(0, 1), (2, 3), (5, 6), (7, 8)]);
    }

    #[test]
    fn test_pixel_pairs_interleave_channels() {
        let carrier = ImageCarrier::from_samples(2, 1, 3, vec![0; 6]).unwrap();
        let pairs: Vec<_> = carrier.pixel_pairs().collect();
        assert_eq!(pairs, vec![(0, 3), (1, 4), (2, 5)]);
    }

    #[test]
    fn test_png_roundtrip_preserves_samples() {
        let carrier = ImageCarrier::from_image(create_test_image(32, 16)).unwrap();
        let png = carrier.to_png_bytes().unwrap();

        let reloaded = ImageCarrier::from_bytes(&png).unwrap();
        assert_eq!(reloaded.samples(), carrier.samples());
        assert_eq!(reloaded.source_format(), Some(ImageFormat::Png));
        assert!(!reloaded.is_lossy_source());
    }

    #[test]
    fn test_save_refuses_lossy_format() {
        let dir = tempfile::tempdir().unwrap();
        let carrier = ImageCarrier::from_image(create_test_image(8, 8)).unwrap();

        let result = carrier.save(dir.path().join("out.jpg"), false);
        assert!(matches!(result, Err(StegoError::UnsupportedFormat(_))));
        assert!(!dir.path().join("out.jpg").exists());

        carrier.save(dir.path().join("out.bmp"), false).unwrap();
        let reloaded = ImageCarrier::from_file(dir.path().join("out.bmp")).unwrap();
        assert_eq!(reloaded.samples(), carrier.samples());
    }

    #[test]
    fn test_bmp_refuses_layouts_it_cannot_keep() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bmp");
        std::fs::write(&path, b"previous content").unwrap();

        for channels in [1u8, 2] {
            let samples = (0..16 * 16 * channels as usize).map(|i| (i * 7) as u8).collect();
            let carrier = ImageCarrier::from_samples(16, 16, channels, samples).unwrap();

            let result = carrier.save(&path, false);
            assert!(matches!(result, Err(StegoError::UnsupportedFormat(_))));
            assert_eq!(std::fs::read(&path).unwrap(), b"previous content");
        }
    }

    #[test]
    fn test_tga_reloads_through_extension_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tga");
        let carrier = ImageCarrier::from_image(create_test_image(12, 10)).unwrap();

        carrier.save(&path, false).unwrap();
        let reloaded = ImageCarrier::from_file(&path).unwrap();
        assert_eq!(reloaded.samples(), carrier.samples());
        assert_eq!(reloaded.source_format(), Some(ImageFormat::Tga));
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let result = ImageCarrier::from_bytes(b"definitely not an image");
        assert!(matches!(result, Err(StegoError::CarrierUnreadable(_))));
    }
}
