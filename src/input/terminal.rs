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
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{
    self, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, info, span, Level};

use super::Event;
use crate::display::terminal::pad_at;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A driver that reads key presses and mouse clicks from a terminal in raw
/// mode. Clicks are hit-tested against the pad grid as it is drawn.
pub struct Driver {}

impl Driver {
    pub fn new() -> Driver {
        Driver {}
    }
}

impl Default for Driver {
    fn default() -> Self {
        Driver::new()
    }
}

/// Maps a terminal event to a drum machine event. `area` is the full screen.
fn translate(event: event::Event, area: Rect) -> Option<Event> {
    match event {
        event::Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) => match code {
            KeyCode::Esc => Some(Event::Quit),
            KeyCode::Char(c) => Some(Event::Key(c)),
            _ => None,
        },
        event::Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => pad_at(area, column, row).map(Event::Click),
        event::Event::Resize(_, _) => Some(Event::Redraw),
        _ => None,
    }
}

impl super::Driver for Driver {
    fn monitor_events(
        &self,
        events_tx: UnboundedSender<Event>,
        stop: Arc<AtomicBool>,
    ) -> JoinHandle<Result<(), io::Error>> {
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "terminal driver");
            let _enter = span.enter();

            info!("Terminal driver started.");

            while !stop.load(Ordering::Relaxed) {
                if !event::poll(POLL_INTERVAL)? {
                    continue;
                }

                let terminal_event = event::read()?;
                let (width, height) = crossterm::terminal::size()?;
                let Some(event) = translate(terminal_event, Rect::new(0, 0, width, height)) else {
                    continue;
                };

                debug!(event = ?event, "Terminal event.");
                events_tx
                    .send(event)
                    .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?;
                if event == Event::Quit {
                    break;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use crossterm::event::KeyModifiers;

    use super::*;

    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 66,
        height: 18,
    };

    fn key(code: KeyCode, modifiers: KeyModifiers) -> event::Event {
        event::Event::Key(KeyEvent::new(code, modifiers))
    }

    fn click(kind: MouseEventKind, column: u16, row: u16) -> event::Event {
        event::Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_keys() {
        assert_eq!(
            Some(Event::Key('q')),
            translate(key(KeyCode::Char('q'), KeyModifiers::NONE), AREA)
        );
        assert_eq!(
            Some(Event::Key('Q')),
            translate(key(KeyCode::Char('Q'), KeyModifiers::SHIFT), AREA)
        );
        assert_eq!(
            Some(Event::Key('1')),
            translate(key(KeyCode::Char('1'), KeyModifiers::NONE), AREA)
        );
        assert_eq!(None, translate(key(KeyCode::Enter, KeyModifiers::NONE), AREA));
        assert_eq!(
            None,
            translate(
                event::Event::Key(KeyEvent::new_with_kind(
                    KeyCode::Char('q'),
                    KeyModifiers::NONE,
                    KeyEventKind::Release
                )),
                AREA
            )
        );
    }

    #[test]
    fn test_only_escape_quits() {
        assert_eq!(
            Some(Event::Quit),
            translate(key(KeyCode::Esc, KeyModifiers::NONE), AREA)
        );
        assert_eq!(
            Some(Event::Key('c')),
            translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL), AREA)
        );
        assert_eq!(
            Some(Event::Key('q')),
            translate(key(KeyCode::Char('q'), KeyModifiers::ALT), AREA)
        );
    }

    #[test]
    fn test_clicks() {
        // Row 5 is the first grid row, just below the title and display box.
        assert_eq!(
            Some(Event::Click(0)),
            translate(click(MouseEventKind::Down(MouseButton::Left), 1, 5), AREA)
        );
        assert_eq!(
            Some(Event::Click(2)),
            translate(click(MouseEventKind::Down(MouseButton::Left), 65, 5), AREA)
        );
        assert_eq!(
            None,
            translate(click(MouseEventKind::Down(MouseButton::Right), 1, 5), AREA)
        );
        assert_eq!(
            None,
            translate(click(MouseEventKind::Up(MouseButton::Left), 1, 5), AREA)
        );
        assert_eq!(
            None,
            translate(click(MouseEventKind::Down(MouseButton::Left), 1, 0), AREA)
        );
    }

    #[test]
    fn test_resize() {
        assert_eq!(
            Some(Event::Redraw),
            translate(event::Event::Resize(80, 24), AREA)
        );
    }
}
