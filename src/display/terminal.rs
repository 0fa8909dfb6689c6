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

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::{help_text, TITLE};
use crate::pads::{PadRegistry, PAD_COUNT, PADS_PER_ROW};
use crate::state::UiState;

const ROWS: usize = PAD_COUNT / PADS_PER_ROW;

/// Where everything goes on screen.
struct Areas {
    title: Rect,
    display: Rect,
    pads: [Rect; PAD_COUNT],
    help: Rect,
}

impl Areas {
    fn new(area: Rect) -> Areas {
        let [title, display, grid, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(ROWS as u16 * 3),
            Constraint::Length(1),
        ])
        .areas(area);

        let rows: [Rect; ROWS] =
            Layout::vertical([Constraint::Ratio(1, ROWS as u32); ROWS]).areas(grid);
        let mut pads = [Rect::default(); PAD_COUNT];
        for (row_index, row) in rows.into_iter().enumerate() {
            let cells: [Rect; PADS_PER_ROW] =
                Layout::horizontal([Constraint::Ratio(1, PADS_PER_ROW as u32); PADS_PER_ROW])
                    .areas(row);
            for (column, cell) in cells.into_iter().enumerate() {
                pads[row_index * PADS_PER_ROW + column] = cell;
            }
        }

        Areas {
            title,
            display,
            pads,
            help,
        }
    }
}

/// Finds the pad drawn at the given screen position, if any. Uses the same
/// layout as rendering, so clicks land on what the user sees.
pub fn pad_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    Areas::new(area)
        .pads
        .iter()
        .position(|pad| pad.contains(Position::new(column, row)))
}

/// Full screen terminal display.
pub struct Display<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> Display<B> {
    /// Create a new display
    pub fn new(backend: B) -> io::Result<Self> {
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }

    #[cfg(test)]
    fn backend(&self) -> &B {
        self.terminal.backend()
    }
}

impl<B: Backend> super::Display for Display<B> {
    fn render(&mut self, state: &UiState, registry: &PadRegistry) -> Result<(), io::Error> {
        self.terminal.draw(|frame| {
            let areas = Areas::new(frame.area());

            let title = Paragraph::new(TITLE)
                .style(Style::default().bold())
                .alignment(Alignment::Center);
            frame.render_widget(title, areas.title);

            let display = Paragraph::new(state.shown_text())
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(display, areas.display);

            for (pad, area) in registry.iter().zip(areas.pads) {
                let style = if state.is_active(pad) {
                    Style::default().fg(Color::Cyan).bold().reversed()
                } else {
                    Style::default()
                };
                let text = vec![Line::from(pad.key().to_string()).bold(), Line::from(pad.name())];
                let widget = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .style(style)
                    .block(Block::default().borders(Borders::ALL));
                frame.render_widget(widget, area);
            }

            let help = Paragraph::new(help_text(registry))
                .style(Style::default().dim())
                .alignment(Alignment::Center);
            frame.render_widget(help, areas.help);
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use ratatui::backend::TestBackend;

    use crate::display::Display as _;
    use crate::pads::DEFAULT_PADS;

    use super::*;

    const WIDTH: u16 = 66;
    const HEIGHT: u16 = 18;

    fn screen(display: &Display<TestBackend>) -> Vec<String> {
        let buffer = display.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect()
            })
            .collect()
    }

    fn center(area: Rect) -> (u16, u16) {
        (area.x + area.width / 2, area.y + area.height / 2)
    }

    #[test]
    fn test_render_placeholder_and_pads() -> Result<(), io::Error> {
        let mut display = Display::new(TestBackend::new(WIDTH, HEIGHT))?;
        display.render(&UiState::new(), &PadRegistry::default())?;

        let screen = screen(&display).join("\n");
        assert!(screen.contains(TITLE));
        assert!(screen.contains("Press a key or click a pad"));
        assert!(screen.contains("Kick-n'-Hat"));
        assert!(screen.contains("Closed-HH"));
        assert!(screen.contains("Use your keyboard (Q, W, E, A, S, D, Z, X, C)"));
        Ok(())
    }

    #[test]
    fn test_render_active_pad() -> Result<(), io::Error> {
        let mut display = Display::new(TestBackend::new(WIDTH, HEIGHT))?;
        let mut state = UiState::new();
        state.triggered(&DEFAULT_PADS[0]);
        display.render(&state, &PadRegistry::default())?;

        let screen = screen(&display).join("\n");
        assert!(!screen.contains("Press a key or click a pad"));
        assert!(screen.contains("Heater 1"));

        let areas = Areas::new(Rect::new(0, 0, WIDTH, HEIGHT));
        let buffer = display.backend().buffer();
        assert!(buffer[center(areas.pads[0])]
            .modifier
            .contains(Modifier::REVERSED));
        assert!(!buffer[center(areas.pads[1])]
            .modifier
            .contains(Modifier::REVERSED));
        Ok(())
    }

    #[test]
    fn test_pad_at() {
        let area = Rect::new(0, 0, WIDTH, HEIGHT);
        let areas = Areas::new(area);
        for (index, pad) in areas.pads.iter().enumerate() {
            let (x, y) = center(*pad);
            assert_eq!(Some(index), pad_at(area, x, y));
        }
        assert_eq!(None, pad_at(area, 0, 0));
        assert_eq!(None, pad_at(area, 0, HEIGHT - 1));
        assert_eq!(None, pad_at(area, WIDTH, HEIGHT));
    }
}
