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

//! The fixed pad registry.
//!
//! The nine pads are compiled in. Nothing mutates the registry after it has
//! been constructed, so everything hands out `&'static Pad` references.

use std::collections::HashSet;
use std::fmt;

/// The number of pads in a registry.
pub const PAD_COUNT: usize = 9;

/// The number of pads per row in the grid.
pub const PADS_PER_ROW: usize = 3;

/// The stock kit.
pub static DEFAULT_PADS: [Pad; PAD_COUNT] = [
    Pad::new(
        "heater-1",
        'Q',
        "Heater 1",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Heater-1.mp3",
    ),
    Pad::new(
        "heater-2",
        'W',
        "Heater 2",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Heater-2.mp3",
    ),
    Pad::new(
        "heater-3",
        'E',
        "Heater 3",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Heater-3.mp3",
    ),
    Pad::new(
        "heater-4",
        'A',
        "Heater 4",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Heater-4_1.mp3",
    ),
    Pad::new(
        "clap",
        'S',
        "Clap",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Heater-6.mp3",
    ),
    Pad::new(
        "open-hh",
        'D',
        "Open-HH",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Dsc_Oh.mp3",
    ),
    Pad::new(
        "kick-n-hat",
        'Z',
        "Kick-n'-Hat",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Kick_n_Hat.mp3",
    ),
    Pad::new(
        "kick",
        'X',
        "Kick",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/RP4_KICK_1.mp3",
    ),
    Pad::new(
        "closed-hh",
        'C',
        "Closed-HH",
        "https://cdn.freecodecamp.org/testable-projects-fcc/audio/Cev_H2.mp3",
    ),
];

/// A single key/sound/name binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pad {
    id: &'static str,
    key: char,
    name: &'static str,
    audio_source: &'static str,
}

impl Pad {
    /// Creates a new pad.
    pub const fn new(
        id: &'static str,
        key: char,
        name: &'static str,
        audio_source: &'static str,
    ) -> Pad {
        Pad {
            id,
            key,
            name,
            audio_source,
        }
    }

    /// The unique identifier of the pad.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// The trigger key. Always a single uppercase letter.
    pub fn key(&self) -> char {
        self.key
    }

    /// The label shown in the display when the pad is triggered.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The locator of the pad's sound.
    pub fn audio_source(&self) -> &'static str {
        self.audio_source
    }
}

impl fmt::Display for Pad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.key, self.name, self.id)
    }
}

/// Errors raised when a pad table breaks the registry invariants.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("a registry needs exactly {PAD_COUNT} pads, got {0}")]
    WrongSize(usize),

    #[error("pad {id} has key {key:?}, keys must be a single uppercase letter")]
    InvalidKey { id: &'static str, key: char },

    #[error("key {0:?} is bound to more than one pad")]
    DuplicateKey(char),

    #[error("pad id {0} is used more than once")]
    DuplicateId(&'static str),
}

/// An ordered, read-only set of pads.
#[derive(Debug, Clone, Copy)]
pub struct PadRegistry {
    pads: &'static [Pad],
}

impl PadRegistry {
    /// Creates a registry from the given pad table, validating it.
    pub fn new(pads: &'static [Pad]) -> Result<PadRegistry, RegistryError> {
        if pads.len() != PAD_COUNT {
            return Err(RegistryError::WrongSize(pads.len()));
        }

        let mut keys = HashSet::new();
        let mut ids = HashSet::new();
        for pad in pads {
            if !pad.key.is_ascii_uppercase() {
                return Err(RegistryError::InvalidKey {
                    id: pad.id,
                    key: pad.key,
                });
            }
            if !keys.insert(pad.key) {
                return Err(RegistryError::DuplicateKey(pad.key));
            }
            if !ids.insert(pad.id) {
                return Err(RegistryError::DuplicateId(pad.id));
            }
        }

        Ok(PadRegistry { pads })
    }

    /// Finds the pad bound to the given key. Matching ignores case.
    pub fn find_by_key(&self, key: char) -> Option<&'static Pad> {
        // to_uppercase can expand to several characters; none of those match.
        let mut upper = key.to_uppercase();
        let key = match (upper.next(), upper.next()) {
            (Some(key), None) => key,
            _ => return None,
        };
        self.pads.iter().find(|pad| pad.key == key)
    }

    /// Finds the pad with the given identifier.
    pub fn find_by_id(&self, id: &str) -> Option<&'static Pad> {
        self.pads.iter().find(|pad| pad.id == id)
    }

    /// Gets the pad at the given grid position.
    pub fn get(&self, index: usize) -> Option<&'static Pad> {
        self.pads.get(index)
    }

    /// Returns the position of the pad with the given key.
    pub fn index_of(&self, key: char) -> Option<usize> {
        self.pads.iter().position(|pad| pad.key == key)
    }

    /// Iterates over the pads in grid order.
    pub fn iter(&self) -> impl Iterator<Item = &'static Pad> {
        self.pads.iter()
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    /// The trigger keys, in grid order.
    pub fn keys(&self) -> Vec<char> {
        self.pads.iter().map(|pad| pad.key).collect()
    }
}

impl Default for PadRegistry {
    fn default() -> Self {
        PadRegistry {
            pads: &DEFAULT_PADS,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const AUDIO_BASE: &str = "https://cdn.freecodecamp.org/testable-projects-fcc/audio/";

    #[test]
    fn test_default_registry_is_valid() {
        let registry = PadRegistry::new(&DEFAULT_PADS).expect("stock kit should be valid");
        assert_eq!(PAD_COUNT, registry.len());
        assert_eq!(
            vec!['Q', 'W', 'E', 'A', 'S', 'D', 'Z', 'X', 'C'],
            registry.keys()
        );
        for pad in registry.iter() {
            assert!(pad.audio_source().starts_with(AUDIO_BASE));
        }
    }

    #[test]
    fn test_find_by_key_ignores_case() {
        let registry = PadRegistry::default();

        let upper = registry.find_by_key('Q').expect("Q should match");
        let lower = registry.find_by_key('q').expect("q should match");
        assert_eq!(upper, lower);
        assert_eq!("heater-1", upper.id());
        assert_eq!("Heater 1", upper.name());

        for pad in registry.iter() {
            let lower = pad.key().to_ascii_lowercase();
            assert_eq!(Some(pad), registry.find_by_key(lower));
        }
    }

    #[test]
    fn test_find_by_key_misses() {
        let registry = PadRegistry::default();
        for key in ['1', 'B', 'm', ' ', '\n', 'ß', 'é'] {
            assert_eq!(None, registry.find_by_key(key), "{:?} should not match", key);
        }
    }

    #[test]
    fn test_find_by_id() {
        let registry = PadRegistry::default();
        assert_eq!(Some('Z'), registry.find_by_id("kick-n-hat").map(|p| p.key()));
        assert_eq!(Some("Kick-n'-Hat"), registry.find_by_id("kick-n-hat").map(|p| p.name()));
        assert_eq!(None, registry.find_by_id("KICK"));
        assert_eq!(None, registry.find_by_id("snare"));
    }

    #[test]
    fn test_index_of() {
        let registry = PadRegistry::default();
        assert_eq!(Some(0), registry.index_of('Q'));
        assert_eq!(Some(8), registry.index_of('C'));
        assert_eq!(None, registry.index_of('q'));
    }

    static TOO_FEW: [Pad; 1] = [Pad::new("one", 'Q', "One", "one.wav")];

    static LOWERCASE: [Pad; PAD_COUNT] = [
        Pad::new("a", 'q', "A", "a.wav"),
        Pad::new("b", 'W', "B", "b.wav"),
        Pad::new("c", 'E', "C", "c.wav"),
        Pad::new("d", 'A', "D", "d.wav"),
        Pad::new("e", 'S', "E", "e.wav"),
        Pad::new("f", 'D', "F", "f.wav"),
        Pad::new("g", 'Z', "G", "g.wav"),
        Pad::new("h", 'X', "H", "h.wav"),
        Pad::new("i", 'C', "I", "i.wav"),
    ];

    static DUPLICATE_KEY: [Pad; PAD_COUNT] = [
        Pad::new("a", 'Q', "A", "a.wav"),
        Pad::new("b", 'W', "B", "b.wav"),
        Pad::new("c", 'E', "C", "c.wav"),
        Pad::new("d", 'A', "D", "d.wav"),
        Pad::new("e", 'S', "E", "e.wav"),
        Pad::new("f", 'D', "F", "f.wav"),
        Pad::new("g", 'Z', "G", "g.wav"),
        Pad::new("h", 'X', "H", "h.wav"),
        Pad::new("i", 'Q', "I", "i.wav"),
    ];

    static DUPLICATE_ID: [Pad; PAD_COUNT] = [
        Pad::new("a", 'Q', "A", "a.wav"),
        Pad::new("b", 'W', "B", "b.wav"),
        Pad::new("c", 'E', "C", "c.wav"),
        Pad::new("d", 'A', "D", "d.wav"),
        Pad::new("e", 'S', "E", "e.wav"),
        Pad::new("f", 'D', "F", "f.wav"),
        Pad::new("g", 'Z', "G", "g.wav"),
        Pad::new("h", 'X', "H", "h.wav"),
        Pad::new("a", 'C', "I", "i.wav"),
    ];

    #[test]
    fn test_invalid_registries() {
        assert_eq!(
            Some(RegistryError::WrongSize(1)),
            PadRegistry::new(&TOO_FEW).err()
        );
        assert_eq!(
            Some(RegistryError::InvalidKey { id: "a", key: 'q' }),
            PadRegistry::new(&LOWERCASE).err()
        );
        assert_eq!(
            Some(RegistryError::DuplicateKey('Q')),
            PadRegistry::new(&DUPLICATE_KEY).err()
        );
        assert_eq!(
            Some(RegistryError::DuplicateId("a")),
            PadRegistry::new(&DUPLICATE_ID).err()
        );
    }
}
