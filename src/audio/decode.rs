// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use super::SampleError;

/// A fully decoded audio file.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Interleaved samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// The number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }
}

/// Decodes an entire audio file (WAV, MP3, FLAC, ...) into memory.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, SampleError> {
    let file = File::open(path).map_err(|e| {
        SampleError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let unsupported = |reason: String| SampleError::Unsupported {
        path: path.display().to_string(),
        reason,
    };

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| unsupported(e.to_string()))?;
    let mut format_reader = probed.format;

    let track = format_reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| unsupported("no audio track found".to_string()))?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| unsupported("sample rate not specified".to_string()))?;
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| unsupported(e.to_string()))?;

    let mut samples = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;
    while let Some(packet) = next_packet(format_reader.as_mut(), decoder.as_mut())? {
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            // A corrupt packet drops a few milliseconds, not the whole sample.
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        if channels == 0 {
            // Some containers only reveal the layout once a packet is decoded.
            channels = spec.channels.count() as u16;
        }

        let needed = decoded.capacity() * spec.channels.count();
        if buffer.as_ref().is_none_or(|b| b.capacity() < needed) {
            buffer = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }
        if let Some(buffer) = buffer.as_mut() {
            buffer.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buffer.samples());
        }
    }

    if channels == 0 {
        return Err(unsupported("channels not specified".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        channels,
        sample_rate,
    })
}

/// Reads the next packet. Returns `Ok(None)` at the end of the stream.
fn next_packet(
    format_reader: &mut dyn FormatReader,
    decoder: &mut dyn Decoder,
) -> Result<Option<Packet>, SampleError> {
    loop {
        match format_reader.next_packet() {
            Ok(packet) => return Ok(Some(packet)),
            Err(SymphoniaError::ResetRequired) => decoder.reset(),
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            // Some demuxers report the end of the stream as a decode error.
            Err(SymphoniaError::DecodeError(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use crate::testutil::write_wav;

    use super::*;

    #[test]
    fn test_decode_mono_wav() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("mono.wav");
        write_wav(&path, 1, 22050, &[0, 16384, -16384, 32767])?;

        let decoded = decode_file(&path)?;
        assert_eq!(1, decoded.channels);
        assert_eq!(22050, decoded.sample_rate);
        assert_eq!(4, decoded.frames());
        assert_eq!(0.0, decoded.samples[0]);
        assert!((decoded.samples[1] - 0.5).abs() < 1e-4);
        assert!((decoded.samples[2] + 0.5).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_decode_stereo_wav() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 2, 44100, &[16384, -16384, 8192, -8192])?;

        let decoded = decode_file(&path)?;
        assert_eq!(2, decoded.channels);
        assert_eq!(2, decoded.frames());
        assert!((decoded.samples[0] - 0.5).abs() < 1e-4);
        assert!((decoded.samples[1] + 0.5).abs() < 1e-4);
        assert!((decoded.samples[2] - 0.25).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn test_decode_missing_file() {
        let result = decode_file(&PathBuf::from("does/not/exist.wav"));
        match result {
            Err(SampleError::Io(e)) => {
                assert_eq!(std::io::ErrorKind::NotFound, e.kind());
                assert!(e.to_string().contains("does/not/exist.wav"));
            }
            other => panic!("expected an IO error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_garbage() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not a wav file at all")?;

        assert!(matches!(
            decode_file(&path),
            Err(SampleError::Unsupported { .. })
        ));
        Ok(())
    }
}
