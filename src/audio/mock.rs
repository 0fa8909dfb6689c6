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
use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::debug;

use super::mixer::{command_channel, Mixer, MixerCommand};
use super::{LoadedSample, PlaybackError, VoiceId};

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

const CHANNELS: u16 = 2;

#[derive(Default)]
struct Voices {
    next_id: usize,
    attached: HashSet<usize>,
    restarts: HashMap<usize, usize>,
    detaches: usize,
}

/// A mock device. Doesn't output anything, but mixes on demand so playback
/// can be inspected.
#[derive(Clone)]
pub struct Device {
    name: String,
    sample_rate: u32,
    commands: Sender<MixerCommand>,
    mixer: Arc<Mutex<Mixer>>,
    voices: Arc<Mutex<Voices>>,
}

impl Device {
    /// Gets the given mock device.
    pub fn get(name: &str, sample_rate: u32) -> Device {
        let (commands, receiver) = command_channel();
        Device {
            name: name.to_string(),
            sample_rate,
            commands,
            mixer: Arc::new(Mutex::new(Mixer::new(receiver, CHANNELS))),
            voices: Arc::new(Mutex::new(Voices::default())),
        }
    }

    /// Mixes the given number of frames, as an output callback would.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        let mut output = vec![0.0; frames * CHANNELS as usize];
        self.mixer.lock().process(&mut output);
        output
    }

    /// Returns the playback position of the voice.
    pub fn cursor(&self, voice: VoiceId) -> Option<usize> {
        let mut mixer = self.mixer.lock();
        mixer.apply_commands();
        mixer.cursor(voice)
    }

    /// Returns whether the voice is playing.
    pub fn is_playing(&self, voice: VoiceId) -> bool {
        let mut mixer = self.mixer.lock();
        mixer.apply_commands();
        mixer.is_playing(voice)
    }

    /// Returns how many times the voice has been restarted.
    pub fn restarts(&self, voice: VoiceId) -> usize {
        self.voices
            .lock()
            .restarts
            .get(&voice.0)
            .copied()
            .unwrap_or(0)
    }

    /// The total number of restarts across all voices.
    pub fn total_restarts(&self) -> usize {
        self.voices.lock().restarts.values().sum()
    }

    /// The number of voices currently attached.
    pub fn attached(&self) -> usize {
        self.voices.lock().attached.len()
    }

    /// The number of detach calls that released a voice.
    pub fn detaches(&self) -> usize {
        self.voices.lock().detaches
    }
}

impl super::Device for Device {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn attach(&self, sample: LoadedSample) -> Result<VoiceId, PlaybackError> {
        let id = {
            let mut voices = self.voices.lock();
            let id = VoiceId(voices.next_id);
            voices.next_id += 1;
            voices.attached.insert(id.0);
            id
        };
        self.commands
            .send(MixerCommand::Attach(id, sample))
            .map_err(|_| PlaybackError::Disconnected)?;
        debug!(device = self.name, voice = %id, "Voice attached (mock).");
        Ok(id)
    }

    fn restart(&self, voice: VoiceId) -> Result<(), PlaybackError> {
        {
            let mut voices = self.voices.lock();
            if !voices.attached.contains(&voice.0) {
                return Err(PlaybackError::UnknownVoice(voice));
            }
            *voices.restarts.entry(voice.0).or_default() += 1;
        }
        self.commands
            .send(MixerCommand::Restart(voice))
            .map_err(|_| PlaybackError::Disconnected)
    }

    fn detach(&self, voice: VoiceId) {
        let mut voices = self.voices.lock();
        if voices.attached.remove(&voice.0) {
            voices.detaches += 1;
            let _ = self.commands.send(MixerCommand::Detach(voice));
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
