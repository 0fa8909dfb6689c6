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

//! Sample loading and caching for pads.
//!
//! Samples are decoded entirely into memory when the drum machine mounts and
//! converted to the device's layout, so a trigger never touches the disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::decode::decode_file;
use super::SampleError;

/// A decoded sample in the device's sample rate and channel layout.
/// The data is shared between every voice that plays it.
#[derive(Clone, Debug)]
pub struct LoadedSample {
    /// Interleaved samples.
    data: Arc<Vec<f32>>,
    channel_count: u16,
    sample_rate: u32,
}

impl LoadedSample {
    /// Creates a sample from interleaved data that already matches the device.
    pub fn from_interleaved(data: Vec<f32>, channel_count: u16, sample_rate: u32) -> Self {
        LoadedSample {
            data: Arc::new(data),
            channel_count,
            sample_rate,
        }
    }

    /// The interleaved sample data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// The number of frames in the sample.
    pub fn frames(&self) -> usize {
        if self.channel_count == 0 {
            0
        } else {
            self.data.len() / self.channel_count as usize
        }
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64)
    }

    /// Returns the memory size in bytes.
    pub fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Maps a pad's audio locator to a file inside the samples directory.
///
/// URIs resolve to their last path segment, so the stock kit's CDN locators
/// find local copies of the same files. Absolute paths are used as given.
pub fn resolve_source(samples_dir: &Path, audio_source: &str) -> PathBuf {
    if let Some((_, rest)) = audio_source.split_once("://") {
        let path = rest.split(['?', '#']).next().unwrap_or(rest);
        let file = path.rsplit('/').next().unwrap_or(path);
        return samples_dir.join(file);
    }

    let path = Path::new(audio_source);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        samples_dir.join(path)
    }
}

/// Loads samples and caches them by path.
pub struct SampleLoader {
    cache: HashMap<PathBuf, LoadedSample>,
    /// Sample rate of the output device.
    target_sample_rate: u32,
    /// Channel count of the output device.
    target_channels: u16,
}

impl SampleLoader {
    /// Creates a loader that converts everything to the given device layout.
    pub fn new(target_sample_rate: u32, target_channels: u16) -> Self {
        Self {
            cache: HashMap::new(),
            target_sample_rate,
            target_channels,
        }
    }

    /// Loads a sample from a file into memory.
    /// Returns the cached copy if the file was loaded before.
    pub fn load(&mut self, path: &Path) -> Result<LoadedSample, SampleError> {
        if let Some(sample) = self.cache.get(path) {
            debug!(path = ?path, "Using cached sample");
            return Ok(sample.clone());
        }

        let decoded = decode_file(path)?;

        let samples = conform_channels(&decoded.samples, decoded.channels, self.target_channels);
        let samples = if decoded.sample_rate != self.target_sample_rate {
            debug!(
                source_rate = decoded.sample_rate,
                target_rate = self.target_sample_rate,
                "Transcoding sample"
            );
            transcode_samples(
                &samples,
                self.target_channels,
                decoded.sample_rate,
                self.target_sample_rate,
            )
        } else {
            samples
        };

        let loaded =
            LoadedSample::from_interleaved(samples, self.target_channels, self.target_sample_rate);

        info!(
            path = ?path,
            source_channels = decoded.channels,
            source_rate = decoded.sample_rate,
            duration_ms = loaded.duration().as_millis(),
            memory_kb = loaded.memory_size() / 1024,
            "Sample loaded"
        );

        self.cache.insert(path.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    /// Returns the total memory used by cached samples.
    pub fn total_memory_usage(&self) -> usize {
        self.cache.values().map(|s| s.memory_size()).sum()
    }
}

impl std::fmt::Debug for SampleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleLoader")
            .field("cached_samples", &self.cache.len())
            .field("target_sample_rate", &self.target_sample_rate)
            .field("target_channels", &self.target_channels)
            .field("total_memory_kb", &(self.total_memory_usage() / 1024))
            .finish()
    }
}

/// Converts interleaved samples to the target channel count. Mono sources are
/// copied to every output channel; otherwise channels are matched by index,
/// extra source channels are dropped and missing ones stay silent.
fn conform_channels(samples: &[f32], source_channels: u16, target_channels: u16) -> Vec<f32> {
    if source_channels == target_channels || source_channels == 0 {
        return samples.to_vec();
    }

    let source = source_channels as usize;
    let target = target_channels as usize;
    let frames = samples.len() / source;
    let mut output = Vec::with_capacity(frames * target);
    for frame in samples.chunks_exact(source) {
        for channel in 0..target {
            let sample = if source == 1 {
                frame[0]
            } else {
                frame.get(channel).copied().unwrap_or(0.0)
            };
            output.push(sample);
        }
    }
    output
}

/// Transcodes samples from one sample rate to another using linear
/// interpolation, which is plenty for one-shot drum hits.
fn transcode_samples(
    samples: &[f32],
    channel_count: u16,
    source_rate: u32,
    target_rate: u32,
) -> Vec<f32> {
    let channels = channel_count as usize;
    if channels == 0 || source_rate == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let source_frames = samples.len() / channels;
    let target_frames = (source_frames as f64 * ratio).ceil() as usize;

    let mut output = Vec::with_capacity(target_frames * channels);
    for target_frame in 0..target_frames {
        let source_pos = target_frame as f64 / ratio;
        let source_frame = source_pos.floor() as usize;
        let frac = source_pos.fract() as f32;

        for channel in 0..channels {
            let s0 = samples
                .get(source_frame * channels + channel)
                .copied()
                .unwrap_or(0.0);
            let s1 = samples
                .get((source_frame + 1) * channels + channel)
                .copied()
                .unwrap_or(s0);
            output.push(s0 + (s1 - s0) * frac);
        }
    }

    output
}
