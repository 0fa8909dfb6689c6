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
use std::{error::Error, fs::File, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio::loader::resolve_source;
use crate::pads::PadRegistry;

/// Writes interleaved 16 bit samples to a WAV file.
pub fn write_wav(
    path: &Path,
    channels: u16,
    sample_rate: u32,
    samples: &[i16],
) -> Result<(), Box<dyn Error>> {
    let mut writer = WavWriter::new(
        File::create(path)?,
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
    )?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Writes a short stereo hit for each of the given pad keys into the samples
/// directory, under the file name the pad's source resolves to.
pub fn write_kit(samples_dir: &Path, keys: &[char]) -> Result<(), Box<dyn Error>> {
    let registry = PadRegistry::default();
    for key in keys {
        let pad = registry
            .find_by_key(*key)
            .ok_or_else(|| format!("no pad for key {}", key))?;
        let path = resolve_source(samples_dir, pad.audio_source());
        // 100ms at 44.1kHz, loud enough to tell apart from silence.
        write_wav(&path, 2, 44100, &[8192; 8820])?;
    }
    Ok(())
}
