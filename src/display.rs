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
use std::io;

use crate::pads::PadRegistry;
use crate::state::UiState;

pub mod line;
pub mod terminal;

pub const TITLE: &str = "Drum Machine";

/// Lists the keys of the registry for the help text.
pub fn help_text(registry: &PadRegistry) -> String {
    let keys: Vec<String> = registry.keys().iter().map(char::to_string).collect();
    format!("Use your keyboard ({}) or click the pads", keys.join(", "))
}

/// Renders the UI state. Rendering never changes the state.
pub trait Display {
    fn render(&mut self, state: &UiState, registry: &PadRegistry) -> Result<(), io::Error>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_help_text() {
        assert_eq!(
            "Use your keyboard (Q, W, E, A, S, D, Z, X, C) or click the pads",
            help_text(&PadRegistry::default())
        );
    }
}
