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
use std::{error::Error, fmt, sync::Arc};

use crate::config;

pub mod cpal;
pub mod decode;
pub mod loader;
pub mod mixer;
pub mod mock;

pub use loader::{LoadedSample, SampleLoader};

/// Identifies a voice (one attached sample) on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoiceId(pub(crate) usize);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice-{}", self.0)
    }
}

/// Errors raised while decoding or loading samples.
#[derive(Debug, thiserror::Error)]
pub enum SampleError {
    #[error("audio file error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path}: {reason}")]
    Unsupported { path: String, reason: String },
}

/// Errors raised when a device rejects a playback command.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("no sample is loaded for this pad")]
    NotLoaded,

    #[error("{0} is not attached to the device")]
    UnknownVoice(VoiceId),

    #[error("the audio device is no longer running")]
    Disconnected,
}

/// Errors raised while opening an output device.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no output device found with name {0}")]
    NotFound(String),

    #[error("unsupported output sample format {0}")]
    UnsupportedFormat(String),

    #[error("audio backend error: {0}")]
    Backend(String),
}

/// An output device that plays attached samples on command.
pub trait Device: fmt::Display + Send + Sync {
    /// The sample rate samples must be converted to before attaching.
    fn sample_rate(&self) -> u32;

    /// The number of interleaved output channels.
    fn channels(&self) -> u16;

    /// Attaches a sample and returns the voice that plays it. The voice is
    /// silent until restarted.
    fn attach(&self, sample: LoadedSample) -> Result<VoiceId, PlaybackError>;

    /// Rewinds the voice to its first frame and starts it.
    fn restart(&self, voice: VoiceId) -> Result<(), PlaybackError>;

    /// Stops the voice and releases its sample.
    fn detach(&self, voice: VoiceId);
}

/// Lists the output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, Box<dyn Error>> {
    cpal::Device::list()
}

/// Gets the device described by the configuration.
pub fn get_device(config: &config::Audio) -> Result<Arc<dyn Device>, Box<dyn Error>> {
    let device = config.device();
    if device.starts_with("mock") {
        return Ok(Arc::new(mock::Device::get(
            device,
            config.sample_rate().unwrap_or(mock::DEFAULT_SAMPLE_RATE),
        )));
    };

    Ok(Arc::new(cpal::Device::get(config)?))
}
