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
use crate::pads::Pad;

/// Shown in the display until the first pad is triggered.
pub const PLACEHOLDER: &str = "Press a key or click a pad";

/// What the user sees: the last triggered pad's name and the pad currently
/// highlighted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    display_text: String,
    active_key: Option<char>,
}

impl UiState {
    pub fn new() -> UiState {
        UiState::default()
    }

    /// The name of the last triggered pad, empty before the first trigger.
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    /// The display text, or the placeholder when nothing has been triggered.
    pub fn shown_text(&self) -> &str {
        if self.display_text.is_empty() {
            PLACEHOLDER
        } else {
            &self.display_text
        }
    }

    pub fn active_key(&self) -> Option<char> {
        self.active_key
    }

    pub fn is_active(&self, pad: &Pad) -> bool {
        self.active_key == Some(pad.key())
    }

    pub(crate) fn triggered(&mut self, pad: &Pad) {
        self.display_text = pad.name().to_string();
        self.active_key = Some(pad.key());
    }

    pub(crate) fn clear_active(&mut self) {
        self.active_key = None;
    }
}
