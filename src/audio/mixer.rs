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
// Core mixing logic shared by the cpal and mock devices.
use crossbeam_channel::{Receiver, Sender};

use super::{LoadedSample, VoiceId};

/// Commands sent from the control side to whoever owns the mixer.
pub enum MixerCommand {
    /// Installs a sample into a voice slot. The voice starts silent.
    Attach(VoiceId, LoadedSample),
    /// Rewinds a voice to frame 0 and plays it.
    Restart(VoiceId),
    /// Stops a voice and frees its slot.
    Detach(VoiceId),
}

/// Creates the command channel between a device and its mixer.
pub fn command_channel() -> (Sender<MixerCommand>, Receiver<MixerCommand>) {
    crossbeam_channel::unbounded()
}

/// One slot per attached sample.
struct Voice {
    sample: LoadedSample,
    /// Next frame to play.
    cursor: usize,
    playing: bool,
}

/// Sums every playing voice into an interleaved output buffer.
///
/// The mixer itself is single-owner: the audio callback holds it and the
/// control side talks to it only through `MixerCommand`s, so the callback
/// never waits on a lock.
pub struct Mixer {
    commands: Receiver<MixerCommand>,
    voices: Vec<Option<Voice>>,
    num_channels: u16,
}

impl Mixer {
    /// Creates a new mixer for the given number of output channels.
    pub fn new(commands: Receiver<MixerCommand>, num_channels: u16) -> Self {
        Self {
            commands,
            voices: Vec::new(),
            num_channels,
        }
    }

    /// Applies every pending command.
    pub fn apply_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                MixerCommand::Attach(id, sample) => {
                    if self.voices.len() <= id.0 {
                        self.voices.resize_with(id.0 + 1, || None);
                    }
                    self.voices[id.0] = Some(Voice {
                        sample,
                        cursor: 0,
                        playing: false,
                    });
                }
                MixerCommand::Restart(id) => {
                    if let Some(Some(voice)) = self.voices.get_mut(id.0) {
                        voice.cursor = 0;
                        voice.playing = true;
                    }
                }
                MixerCommand::Detach(id) => {
                    if let Some(slot) = self.voices.get_mut(id.0) {
                        *slot = None;
                    }
                }
            }
        }
    }

    /// Fills `output` (interleaved, a whole number of frames) with the mix.
    pub fn process(&mut self, output: &mut [f32]) {
        self.apply_commands();
        output.fill(0.0);

        let channels = self.num_channels as usize;
        if channels == 0 {
            return;
        }
        let frames = output.len() / channels;

        for voice in self.voices.iter_mut().flatten() {
            if !voice.playing {
                continue;
            }

            let data = voice.sample.data();
            let voice_channels = voice.sample.channel_count() as usize;
            let remaining = voice.sample.frames().saturating_sub(voice.cursor);
            let to_mix = remaining.min(frames);

            for frame in 0..to_mix {
                let source = (voice.cursor + frame) * voice_channels;
                let dest = frame * channels;
                for channel in 0..channels.min(voice_channels) {
                    output[dest + channel] += data[source + channel];
                }
            }

            voice.cursor += to_mix;
            if voice.cursor >= voice.sample.frames() {
                voice.playing = false;
            }
        }

        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    /// Returns the cursor of a voice, if it is attached.
    pub fn cursor(&self, id: VoiceId) -> Option<usize> {
        self.voice(id).map(|voice| voice.cursor)
    }

    /// Returns whether a voice is currently playing.
    pub fn is_playing(&self, id: VoiceId) -> bool {
        self.voice(id).is_some_and(|voice| voice.playing)
    }

    /// The number of attached voices.
    pub fn attached(&self) -> usize {
        self.voices.iter().flatten().count()
    }

    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.get(id.0).and_then(|slot| slot.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ramp(frames: usize) -> LoadedSample {
        let data = (0..frames)
            .flat_map(|i| {
                let value = i as f32 / 100.0;
                [value, -value]
            })
            .collect();
        LoadedSample::from_interleaved(data, 2, 44100)
    }

    #[test]
    fn test_attached_voice_is_silent_until_restarted() {
        let (tx, rx) = command_channel();
        let mut mixer = Mixer::new(rx, 2);
        tx.send(MixerCommand::Attach(VoiceId(0), ramp(4))).unwrap();

        let mut output = vec![1.0; 8];
        mixer.process(&mut output);
        assert_eq!(vec![0.0; 8], output);
        assert_eq!(Some(0), mixer.cursor(VoiceId(0)));
        assert!(!mixer.is_playing(VoiceId(0)));
    }

    #[test]
    fn test_restart_plays_from_the_beginning() {
        let (tx, rx) = command_channel();
        let mut mixer = Mixer::new(rx, 2);
        tx.send(MixerCommand::Attach(VoiceId(0), ramp(10))).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(0))).unwrap();

        let mut output = vec![0.0; 6];
        mixer.process(&mut output);
        assert_eq!(vec![0.0, 0.0, 0.01, -0.01, 0.02, -0.02], output);
        assert_eq!(Some(3), mixer.cursor(VoiceId(0)));

        // Restarting mid-sample rewinds the same voice instead of adding one.
        tx.send(MixerCommand::Restart(VoiceId(0))).unwrap();
        mixer.process(&mut output);
        assert_eq!(vec![0.0, 0.0, 0.01, -0.01, 0.02, -0.02], output);
        assert_eq!(Some(3), mixer.cursor(VoiceId(0)));
        assert_eq!(1, mixer.attached());
    }

    #[test]
    fn test_voice_stops_at_the_end() {
        let (tx, rx) = command_channel();
        let mut mixer = Mixer::new(rx, 2);
        tx.send(MixerCommand::Attach(VoiceId(0), ramp(2))).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(0))).unwrap();

        let mut output = vec![0.0; 8];
        mixer.process(&mut output);
        assert_eq!(vec![0.0, 0.0, 0.01, -0.01, 0.0, 0.0, 0.0, 0.0], output);
        assert!(!mixer.is_playing(VoiceId(0)));

        mixer.process(&mut output);
        assert_eq!(vec![0.0; 8], output);
    }

    #[test]
    fn test_different_voices_overlap() {
        let (tx, rx) = command_channel();
        let mut mixer = Mixer::new(rx, 2);
        let constant = |value: f32| LoadedSample::from_interleaved(vec![value; 8], 2, 44100);
        tx.send(MixerCommand::Attach(VoiceId(0), constant(0.25))).unwrap();
        tx.send(MixerCommand::Attach(VoiceId(1), constant(0.5))).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(0))).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(1))).unwrap();

        let mut output = vec![0.0; 4];
        mixer.process(&mut output);
        assert_eq!(vec![0.75; 4], output);
    }

    #[test]
    fn test_mix_is_clamped() {
        let (tx, rx) = command_channel();
        let mut mixer = Mixer::new(rx, 1);
        let loud = || LoadedSample::from_interleaved(vec![0.8; 4], 1, 44100);
        tx.send(MixerCommand::Attach(VoiceId(0), loud())).unwrap();
        tx.send(MixerCommand::Attach(VoiceId(1), loud())).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(0))).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(1))).unwrap();

        let mut output = vec![0.0; 2];
        mixer.process(&mut output);
        assert_eq!(vec![1.0, 1.0], output);
    }

    #[test]
    fn test_detach_frees_the_voice() {
        let (tx, rx) = command_channel();
        let mut mixer = Mixer::new(rx, 2);
        tx.send(MixerCommand::Attach(VoiceId(3), ramp(10))).unwrap();
        tx.send(MixerCommand::Restart(VoiceId(3))).unwrap();
        tx.send(MixerCommand::Detach(VoiceId(3))).unwrap();
        // Commands for unknown voices are ignored.
        tx.send(MixerCommand::Restart(VoiceId(7))).unwrap();

        let mut output = vec![0.0; 4];
        mixer.process(&mut output);
        assert_eq!(vec![0.0; 4], output);
        assert_eq!(0, mixer.attached());
        assert_eq!(None, mixer.cursor(VoiceId(3)));
    }
}
