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
use std::io::{self, Write};

use super::{help_text, TITLE};
use crate::pads::PadRegistry;
use crate::state::UiState;

/// Prints one line per state change, with the active pad's key bracketed.
pub struct Display<W: Write> {
    writer: W,
    last: Option<UiState>,
}

impl<W: Write> Display<W> {
    pub fn new(writer: W) -> Display<W> {
        Display { writer, last: None }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer
    }
}

fn format_state(state: &UiState, registry: &PadRegistry) -> String {
    let pads: Vec<String> = registry
        .iter()
        .map(|pad| {
            if state.is_active(pad) {
                format!("[{}]", pad.key())
            } else {
                format!(" {} ", pad.key())
            }
        })
        .collect();
    format!("{} |{}", state.shown_text(), pads.join(""))
}

impl<W: Write> super::Display for Display<W> {
    fn render(&mut self, state: &UiState, registry: &PadRegistry) -> Result<(), io::Error> {
        if self.last.as_ref() == Some(state) {
            return Ok(());
        }
        if self.last.is_none() {
            writeln!(self.writer, "{}: {}", TITLE, help_text(registry))?;
        }
        writeln!(self.writer, "{}", format_state(state, registry))?;
        self.writer.flush()?;
        self.last = Some(state.clone());
        Ok(())
    }
}
