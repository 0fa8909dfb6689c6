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
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, File, FileFormat};
use duration_string::DurationString;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod audio;
pub mod error;

pub use audio::Audio;
pub use error::ConfigError;

const DEFAULT_SAMPLES_DIR: &str = "samples";
const DEFAULT_HIGHLIGHT: &str = "150ms";

/// How the drum machine talks to the user.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Interface {
    /// Full screen terminal UI with keyboard and mouse input.
    #[default]
    Terminal,
    /// Line-oriented stdin/stdout, for pipes and dumb terminals.
    Line,
}

/// A YAML representation of the player configuration.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Player {
    /// The audio output configuration.
    #[serde(default)]
    audio: Audio,

    /// The directory holding the pad samples.
    #[serde(default = "default_samples")]
    samples: String,

    /// How long a triggered pad stays highlighted.
    #[serde(default = "default_highlight")]
    highlight: String,

    /// The user interface.
    #[serde(default)]
    interface: Interface,

    /// The directory relative sample paths resolve against.
    #[serde(skip, default = "default_base_dir")]
    base_dir: PathBuf,
}

fn default_samples() -> String {
    DEFAULT_SAMPLES_DIR.to_string()
}

fn default_highlight() -> String {
    DEFAULT_HIGHLIGHT.to_string()
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Player {
    fn default() -> Self {
        Player {
            audio: Audio::default(),
            samples: default_samples(),
            highlight: default_highlight(),
            interface: Interface::default(),
            base_dir: default_base_dir(),
        }
    }
}

impl Player {
    /// Loads the player configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Player, ConfigError> {
        let mut player: Player = Config::builder()
            .add_source(File::from(path).format(FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        player.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(default_base_dir);
        player.validate()?;

        debug!(path = ?path, "Loaded player config.");
        Ok(player)
    }

    /// Parses the player configuration from a YAML string. Relative paths
    /// resolve against the current directory.
    pub fn from_yaml(yaml: &str) -> Result<Player, ConfigError> {
        let player: Player = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        player.validate()?;
        Ok(player)
    }

    /// Renders the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.audio.validate()?;
        let highlight = self.highlight()?;
        if highlight.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "highlight",
                value: self.highlight.clone(),
            });
        }
        Ok(())
    }

    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    /// Returns the samples directory, resolved against the config file.
    pub fn samples_dir(&self) -> PathBuf {
        self.base_dir.join(&self.samples)
    }

    /// Returns how long a triggered pad stays highlighted.
    pub fn highlight(&self) -> Result<Duration, ConfigError> {
        DurationString::from_string(self.highlight.clone())
            .map(Duration::from)
            .map_err(|e| ConfigError::InvalidDuration {
                field: "highlight",
                value: self.highlight.clone(),
                reason: e.to_string(),
            })
    }

    pub fn interface(&self) -> Interface {
        self.interface
    }

    /// Overrides the configured interface.
    pub fn set_interface(&mut self, interface: Interface) {
        self.interface = interface;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() -> Result<(), ConfigError> {
        let player = Player::from_yaml("{}")?;
        assert_eq!("default", player.audio().device());
        assert_eq!(None, player.audio().sample_rate());
        assert_eq!(Duration::from_millis(150), player.highlight()?);
        assert_eq!(Interface::Terminal, player.interface());
        assert_eq!(PathBuf::from(".").join("samples"), player.samples_dir());
        assert_eq!(Player::default().samples_dir(), player.samples_dir());
        Ok(())
    }

    #[test]
    fn test_full_config() -> Result<(), ConfigError> {
        let yaml = r#"
            audio:
              device: mock-device
              sample_rate: 48000
            samples: kits/stock
            highlight: 200ms
            interface: line
        "#;

        let player = Player::from_yaml(yaml)?;
        assert_eq!("mock-device", player.audio().device());
        assert_eq!(Some(48000), player.audio().sample_rate());
        assert_eq!(Duration::from_millis(200), player.highlight()?);
        assert_eq!(Interface::Line, player.interface());
        Ok(())
    }

    #[test]
    fn test_load_resolves_samples_against_the_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("drumpad.yaml");
        std::fs::write(&path, "samples: kit\naudio:\n  device: mock\n")?;

        let player = Player::load(&path)?;
        assert_eq!(dir.path().join("kit"), player.samples_dir());
        assert_eq!("mock", player.audio().device());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Player::load(Path::new("/no/such/drumpad.yaml")),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Player::from_yaml("highlight: soon"),
            Err(ConfigError::InvalidDuration { field: "highlight", .. })
        ));
        assert!(matches!(
            Player::from_yaml("highlight: 0ms"),
            Err(ConfigError::InvalidValue { field: "highlight", .. })
        ));
        assert!(matches!(
            Player::from_yaml("audio:\n  device: ''"),
            Err(ConfigError::InvalidValue { field: "audio.device", .. })
        ));
        assert!(matches!(
            Player::from_yaml("interface: gui"),
            Err(ConfigError::Load(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip() -> Result<(), ConfigError> {
        let yaml = Player::default().to_yaml()?;
        assert!(yaml.contains("device: default"));
        assert!(yaml.contains("interface: terminal"));
        assert!(!yaml.contains("base_dir"));

        // Scalars may come back quoted, so compare parsed values.
        let parsed = Player::from_yaml(&yaml)?;
        assert_eq!(Duration::from_millis(150), parsed.highlight()?);
        assert_eq!(Player::default().audio(), parsed.audio());
        assert_eq!(Interface::Terminal, parsed.interface());
        assert_eq!(Player::default().samples_dir(), parsed.samples_dir());
        Ok(())
    }
}
