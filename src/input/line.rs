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

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, info, span, warn, Level};

use super::Event;
use crate::pads::PadRegistry;

const QUIT: &str = "quit";
const CLICK: &str = "click";

/// A driver that reads commands from stdin, one line at a time. `quit` quits,
/// `click <pad id>` clicks a pad, anything else is typed key by key.
pub struct Driver {
    registry: PadRegistry,
}

impl Driver {
    pub fn new(registry: PadRegistry) -> Driver {
        Driver { registry }
    }

    /// Reads and dispatches one line. Returns false when the input has ended
    /// or the user quit.
    fn monitor_io<R>(
        registry: &PadRegistry,
        events_tx: &UnboundedSender<Event>,
        mut reader: R,
    ) -> Result<bool, io::Error>
    where
        R: io::BufRead,
    {
        let mut input = String::default();
        if reader.read_line(&mut input)? == 0 {
            debug!("End of input.");
            return Ok(false);
        }

        let input = input.trim();
        let mut words = input.split_whitespace();
        let events: Vec<Event> = match (words.next(), words.next(), words.next()) {
            (Some(command), None, None) if command.eq_ignore_ascii_case(QUIT) => {
                vec![Event::Quit]
            }
            (Some(command), Some(id), None) if command.eq_ignore_ascii_case(CLICK) => {
                match registry.find_by_id(id).and_then(|pad| registry.index_of(pad.key())) {
                    Some(index) => vec![Event::Click(index)],
                    None => {
                        warn!(id, "No pad with this id.");
                        Vec::new()
                    }
                }
            }
            _ => input
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(Event::Key)
                .collect(),
        };

        let quit = events.contains(&Event::Quit);
        for event in events {
            events_tx
                .send(event)
                .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e))?;
        }
        Ok(!quit)
    }
}

impl super::Driver for Driver {
    fn monitor_events(
        &self,
        events_tx: UnboundedSender<Event>,
        stop: Arc<AtomicBool>,
    ) -> JoinHandle<Result<(), io::Error>> {
        let registry = self.registry;
        tokio::task::spawn_blocking(move || {
            let span = span!(Level::INFO, "line driver");
            let _enter = span.enter();

            info!("Line driver started.");

            while !stop.load(Ordering::Relaxed) {
                if !Self::monitor_io(&registry, &events_tx, io::stdin().lock())? {
                    break;
                }
            }
            Ok(())
        })
    }
}
