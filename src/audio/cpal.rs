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
    collections::HashSet,
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, error, info, span, Level};

use super::mixer::{command_channel, Mixer, MixerCommand};
use super::{AudioError, LoadedSample, PlaybackError, VoiceId};
use crate::config;

/// The device name that selects the host's default output.
pub const DEFAULT_DEVICE: &str = "default";

/// A cpal output device with a running stream. The mixer lives inside the
/// stream callback; everything else reaches it through the command channel.
pub struct Device {
    name: String,
    host_id: cpal::HostId,
    sample_rate: u32,
    channels: u16,
    commands: Sender<MixerCommand>,
    next_voice: AtomicUsize,
    attached: Mutex<HashSet<usize>>,
    /// Cleared on drop to stop the output thread.
    running: Arc<AtomicBool>,
    output_thread: Option<thread::JoinHandle<()>>,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Channels={}) (Rate={}) ({})",
            self.name,
            self.channels,
            self.sample_rate,
            self.host_id.name()
        )
    }
}

impl Device {
    /// Lists output devices as printable descriptions.
    pub fn list() -> Result<Vec<String>, Box<dyn Error>> {
        let mut devices: Vec<String> = list_cpal_devices()?
            .into_iter()
            .filter_map(|(host_id, device)| {
                let name = device.name().ok()?;
                let max_channels = device
                    .supported_output_configs()
                    .ok()?
                    .map(|config| config.channels())
                    .max()?;
                Some(format!(
                    "{} (Channels={}) ({})",
                    name,
                    max_channels,
                    host_id.name()
                ))
            })
            .collect();
        devices.sort();
        Ok(devices)
    }

    /// Opens the configured device and starts its output stream.
    pub fn get(config: &config::Audio) -> Result<Device, Box<dyn Error>> {
        let name = config.device();
        let (host_id, device) = if name == DEFAULT_DEVICE {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or_else(|| AudioError::NotFound(name.to_string()))?;
            (host.id(), device)
        } else {
            list_cpal_devices()?
                .into_iter()
                .find(|(_, device)| device.name().is_ok_and(|n| n.trim() == name))
                .ok_or_else(|| AudioError::NotFound(name.to_string()))?
        };

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Backend(e.to_string()))?;
        let sample_format = supported.sample_format();
        let mut stream_config = supported.config();
        if let Some(sample_rate) = config.sample_rate() {
            stream_config.sample_rate = cpal::SampleRate(sample_rate);
        }

        let device_name = device.name().unwrap_or_else(|_| name.to_string());
        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels;
        let (commands, receiver) = command_channel();
        let mixer = Mixer::new(receiver, channels);
        let running = Arc::new(AtomicBool::new(true));

        let output_thread = start_output_thread(
            device,
            stream_config,
            sample_format,
            mixer,
            running.clone(),
        )?;

        info!(
            device = device_name,
            host = host_id.name(),
            sample_rate,
            channels,
            format = %sample_format,
            "Audio output started."
        );

        Ok(Device {
            name: device_name,
            host_id,
            sample_rate,
            channels,
            commands,
            next_voice: AtomicUsize::new(0),
            attached: Mutex::new(HashSet::new()),
            running,
            output_thread: Some(output_thread),
        })
    }
}

impl super::Device for Device {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn attach(&self, sample: LoadedSample) -> Result<VoiceId, PlaybackError> {
        let id = VoiceId(self.next_voice.fetch_add(1, Ordering::Relaxed));
        self.attached.lock().insert(id.0);
        self.commands
            .send(MixerCommand::Attach(id, sample))
            .map_err(|_| PlaybackError::Disconnected)?;
        Ok(id)
    }

    fn restart(&self, voice: VoiceId) -> Result<(), PlaybackError> {
        if !self.attached.lock().contains(&voice.0) {
            return Err(PlaybackError::UnknownVoice(voice));
        }
        if !self.running.load(Ordering::Relaxed) {
            return Err(PlaybackError::Disconnected);
        }
        self.commands
            .send(MixerCommand::Restart(voice))
            .map_err(|_| PlaybackError::Disconnected)
    }

    fn detach(&self, voice: VoiceId) {
        if self.attached.lock().remove(&voice.0) {
            // The stream may already be gone; there is nothing left to free then.
            let _ = self.commands.send(MixerCommand::Detach(voice));
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.output_thread.take() {
            if thread.join().is_err() {
                error!(device = self.name, "Audio output thread panicked.");
            }
        }
    }
}

/// Lists every output device on every host.
fn list_cpal_devices() -> Result<Vec<(cpal::HostId, cpal::Device)>, Box<dyn Error>> {
    // Suppress noisy backend output here.
    let _shh_stdout = shh::stdout()?;
    let _shh_stderr = shh::stderr()?;

    let mut devices = Vec::new();
    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(host) => host,
            Err(e) => {
                error!(err = e.to_string(), host = host_id.name(), "Unable to open host");
                continue;
            }
        };
        match host.output_devices() {
            Ok(host_devices) => devices.extend(host_devices.map(|device| (host_id, device))),
            Err(e) => error!(
                err = e.to_string(),
                host = host_id.name(),
                "Unable to list devices for host"
            ),
        }
    }
    Ok(devices)
}

/// Starts the thread that owns the cpal stream. The stream is not `Send` on
/// every platform, so it is built and dropped on this thread.
fn start_output_thread(
    device: cpal::Device,
    stream_config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    mixer: Mixer,
    running: Arc<AtomicBool>,
) -> Result<thread::JoinHandle<()>, Box<dyn Error>> {
    let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), AudioError>>(1);

    let handle = thread::Builder::new()
        .name("drumpad-audio".to_string())
        .spawn(move || {
            let span = span!(Level::INFO, "audio output");
            let _enter = span.enter();

            let stream = match sample_format {
                cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, mixer),
                cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, mixer),
                cpal::SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, mixer),
                cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, mixer),
                other => Err(AudioError::UnsupportedFormat(other.to_string())),
            }
            .and_then(|stream| {
                stream
                    .play()
                    .map_err(|e| AudioError::Backend(e.to_string()))?;
                Ok(stream)
            });

            let stream = match stream {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            while running.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(50));
            }
            drop(stream);
            debug!("Audio output stream closed.");
        })?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(handle),
        Ok(Err(e)) => {
            let _ = handle.join();
            Err(e.into())
        }
        Err(_) => {
            let _ = handle.join();
            Err(AudioError::Backend("audio output thread exited early".to_string()).into())
        }
    }
}

/// Builds an output stream that pulls frames from the mixer and converts them
/// to the device's native sample type.
fn build_stream<T>(
    device: &cpal::Device,
    stream_config: &cpal::StreamConfig,
    mut mixer: Mixer,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mut scratch: Vec<f32> = Vec::new();
    device
        .build_output_stream(
            stream_config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if scratch.len() != data.len() {
                    scratch.resize(data.len(), 0.0);
                }
                mixer.process(&mut scratch);
                for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
                    *dst = T::from_sample(src);
                }
            },
            |err| error!("CPAL output stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Backend(e.to_string()))
}
