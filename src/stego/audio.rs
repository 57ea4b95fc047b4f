//! Audio carriers.
//!
//! Holds an uncompressed PCM WAV stream as interleaved integer samples
//! (8, 16, 24 or 32 bits). The carrier sample seen by the codecs is the
//! low-order byte of each PCM sample, so an LSB write never moves a sample
//! by more than one quantisation step. The `WavSpec` read from the header is
//! written back unchanged.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;
use tracing::debug;

use super::carrier::{write_artifact, SampleCarrier, Shape};
use super::error::{Result, StegoError};

/// Maps a hound error onto the codec's error kinds.
fn read_error(err: hound::Error) -> StegoError {
    match err {
        hound::Error::IoError(e) => StegoError::IoError(e),
        hound::Error::Unsupported => {
            StegoError::UnsupportedFormat("WAV encoding not supported".to_string())
        }
        other => StegoError::CarrierUnreadable(other.to_string()),
    }
}

fn save_error(err: hound::Error) -> StegoError {
    StegoError::AudioSaveError(err.to_string())
}

/// A PCM WAV carrier.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioCarrier {
    /// Audio specification (sample rate, channels, etc.)
    spec: WavSpec,
    /// Interleaved samples, widened to `i32`
    samples: Vec<i32>,
}

impl AudioCarrier {
    /// Loads an audio carrier from a WAV file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = WavReader::open(path).map_err(read_error)?;
        Self::from_reader(reader)
    }

    /// Loads an audio carrier from WAV bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(read_error)?;
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        check_spec(&spec)?;

        let samples: Vec<i32> = reader
            .into_samples::<i32>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(read_error)?;

        debug!(
            channels = spec.channels,
            sample_rate = spec.sample_rate,
            bits_per_sample = spec.bits_per_sample,
            samples = samples.len(),
            "audio carrier loaded"
        );

        Ok(Self { spec, samples })
    }

    /// Builds a carrier from interleaved samples.
    pub fn from_samples(spec: WavSpec, samples: Vec<i32>) -> Result<Self> {
        check_spec(&spec)?;
        if samples.len() % spec.channels as usize != 0 {
            return Err(StegoError::CarrierUnreadable(format!(
                "{} samples do not fill whole {}-channel frames",
                samples.len(),
                spec.channels
            )));
        }
        Ok(Self { spec, samples })
    }

    /// Saves the audio to a WAV file, replacing `path` in one step.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_wav_bytes()?;
        write_artifact(path.as_ref(), &bytes)
    }

    /// Returns the audio as WAV bytes.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let writer = WavWriter::new(Cursor::new(&mut bytes), self.spec).map_err(save_error)?;
            self.write_samples(writer)?;
        }
        Ok(bytes)
    }

    fn write_samples<W: Write + Seek>(&self, mut writer: WavWriter<W>) -> Result<()> {
        for &sample in &self.samples {
            writer.write_sample(sample).map_err(save_error)?;
        }
        writer.finalize().map_err(save_error)
    }

    /// Returns the audio specification.
    pub fn spec(&self) -> &WavSpec {
        &self.spec
    }

    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Returns the number of samples across all channels.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Returns the number of frames (one sample per channel each).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.spec.channels as usize
    }

    pub fn channels(&self) -> u16 {
        self.spec.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.spec.bits_per_sample
    }

    /// Returns the duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.spec.sample_rate as f64
    }
}

fn check_spec(spec: &WavSpec) -> Result<()> {
    if spec.sample_format != SampleFormat::Int {
        return Err(StegoError::UnsupportedFormat(
            "floating point WAV samples are not supported".to_string(),
        ));
    }
    if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(StegoError::UnsupportedFormat(format!(
            "{}-bit PCM is not supported",
            spec.bits_per_sample
        )));
    }
    if spec.channels == 0 {
        return Err(StegoError::CarrierUnreadable("WAV header declares zero channels".to_string()));
    }
    Ok(())
}

impl SampleCarrier for AudioCarrier {
    fn flat_len(&self) -> usize {
        self.samples.len()
    }

    /// Low-order byte of the PCM sample.
    fn sample(&self, index: usize) -> u8 {
        self.samples[index] as u8
    }

    /// Replaces the low-order byte, keeping the higher bits.
    fn set_sample(&mut self, index: usize, value: u8) {
        let merged = (self.samples[index] & !0xFF) | i32::from(value);
        self.samples[index] = if self.spec.bits_per_sample == 8 {
            // 8-bit PCM is a single signed byte
            i32::from(merged as i8)
        } else {
            merged
        };
    }

    fn shape(&self) -> Shape {
        Shape::Audio {
            channels: self.spec.channels,
            sample_rate: self.spec.sample_rate,
            bits_per_sample: self.spec.bits_per_sample,
            frames: self.frame_count(),
        }
    }
}

/// Creates a simple test WAV audio.
#[cfg(test)]
pub(crate) fn create_test_audio(sample_count: usize, bits_per_sample: u16) -> AudioCarrier {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };

    let amplitude = ((1i64 << (bits_per_sample - 1)) - 1) as f64 * 0.5;

    // Generate a simple sine wave
    let samples: Vec<i32> = (0..sample_count)
        .map(|i| {
            let t = i as f64 / 44100.0;
            let freq = 440.0; // A4 note
            (f64::sin(2.0 * std::f64::consts::PI * freq * t) * amplitude) as i32
        })
        .collect();

    AudioCarrier { spec, samples }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_and_duration() {
        let audio = create_test_audio(44100, 16);
        assert_eq!(audio.sample_count(), 44100);
        assert_eq!(audio.frame_count(), 44100);
        assert!((audio.duration_secs() - 1.0).abs() < 1e-9);

        let stereo = AudioCarrier::from_samples(
            WavSpec {
                channels: 2,
                ..*audio.spec()
            },
            vec![0; 200],
        )
        .unwrap();
        assert_eq!(stereo.frame_count(), 100);
        assert_eq!(stereo.flat_len(), 200);
    }

    #[test]
    fn test_low_byte_view_of_negative_samples() {
        let mut audio = create_test_audio(4, 16);
        audio.samples = vec![-1, -2, 255, 256];

        assert_eq!(audio.sample(0), 0xFF);
        assert_eq!(audio.sample(1), 0xFE);
        assert_eq!(audio.sample(2), 0xFF);
        assert_eq!(audio.sample(3), 0x00);

        audio.set_sample(0, 0xFE);
        audio.set_sample(1, 0xFF);
        audio.set_sample(2, 0xFE);
        audio.set_sample(3, 0x01);
        assert_eq!(audio.samples(), &[-2, -1, 254, 257]);
    }

    #[test]
    fn test_eight_bit_samples_stay_in_range() {
        let mut audio = create_test_audio(3, 8);
        audio.samples = vec![127, -128, 0];

        audio.set_sample(0, (audio.sample(0) & !1) | 1);
        audio.set_sample(1, (audio.sample(1) & !1) | 1);
        audio.set_sample(2, (audio.sample(2) & !1) | 1);
        assert_eq!(audio.samples(), &[127, -127, 1]);
    }

    #[test]
    fn test_wav_roundtrip_preserves_spec_and_samples() {
        for bits in [8, 16, 24, 32] {
            let audio = create_test_audio(1000, bits);
            let bytes = audio.to_wav_bytes().unwrap();
            let loaded = AudioCarrier::from_bytes(&bytes).unwrap();
            assert_eq!(loaded.spec(), audio.spec());
            assert_eq!(loaded.samples(), audio.samples());
        }
    }

    #[test]
    fn test_save_replaces_file_in_one_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        std::fs::write(&path, b"previous content").unwrap();

        let audio = create_test_audio(500, 16);
        audio.save(&path).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(AudioCarrier::from_file(&path).unwrap(), audio);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");

        let result = create_test_audio(100, 16).save(&path);
        assert!(matches!(result, Err(StegoError::IoError(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_rejects_float_wav() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut bytes = Vec::new();
        {
            let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
            writer.write_sample(0.5f32).unwrap();
            writer.finalize().unwrap();
        }

        let result = AudioCarrier::from_bytes(&bytes);
        assert!(matches!(result, Err(StegoError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_rejects_non_wav_bytes() {
        let result = AudioCarrier::from_bytes(b"ID3\x04\x00 not a wav file at all");
        assert!(result.is_err());
    }
}
