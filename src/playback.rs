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
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::{loader::resolve_source, Device, PlaybackError, SampleLoader, VoiceId};
use crate::pads::{Pad, PadRegistry};

/// The per-pad playback resource. Owns one voice on the device for as long
/// as it lives; dropping it releases the voice.
pub struct PlaybackHandle {
    key: char,
    /// None when the pad's sample could not be loaded.
    voice: Option<VoiceId>,
    device: Arc<dyn Device>,
}

impl PlaybackHandle {
    /// Loads the pad's sample and attaches it to the device. A sample that
    /// fails to load yields a handle that can never play.
    pub fn acquire(
        pad: &Pad,
        samples_dir: &Path,
        loader: &mut SampleLoader,
        device: Arc<dyn Device>,
    ) -> PlaybackHandle {
        let path = resolve_source(samples_dir, pad.audio_source());
        let voice = match loader.load(&path) {
            Ok(sample) => match device.attach(sample) {
                Ok(voice) => Some(voice),
                Err(e) => {
                    warn!(pad = pad.id(), err = %e, "Unable to attach sample to device.");
                    None
                }
            },
            Err(e) => {
                warn!(pad = pad.id(), path = ?path, err = %e, "Unable to load sample.");
                None
            }
        };

        PlaybackHandle {
            key: pad.key(),
            voice,
            device,
        }
    }

    /// The key of the pad this handle belongs to.
    pub fn key(&self) -> char {
        self.key
    }

    /// Returns true if the handle has a sample to play.
    pub fn is_loaded(&self) -> bool {
        self.voice.is_some()
    }

    pub fn voice(&self) -> Option<VoiceId> {
        self.voice
    }

    /// Rewinds the sample to the start and plays it.
    pub fn restart(&self) -> Result<(), PlaybackError> {
        let voice = self.voice.ok_or(PlaybackError::NotLoaded)?;
        self.device.restart(voice)
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        if let Some(voice) = self.voice.take() {
            self.device.detach(voice);
        }
    }
}

/// Acquires one handle per pad, keyed by trigger key.
pub fn acquire_handles(
    registry: &PadRegistry,
    samples_dir: &Path,
    device: Arc<dyn Device>,
) -> HashMap<char, PlaybackHandle> {
    let mut loader = SampleLoader::new(device.sample_rate(), device.channels());
    let handles: HashMap<char, PlaybackHandle> = registry
        .iter()
        .map(|pad| {
            (
                pad.key(),
                PlaybackHandle::acquire(pad, samples_dir, &mut loader, device.clone()),
            )
        })
        .collect();

    info!(
        device = %device,
        loaded = handles.values().filter(|h| h.is_loaded()).count(),
        pads = handles.len(),
        memory_kb = loader.total_memory_usage() / 1024,
        "Pad samples loaded."
    );
    handles
}
