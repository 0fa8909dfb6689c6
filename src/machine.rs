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
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, span, Instrument, Level};

use crate::audio::Device;
use crate::display::Display;
use crate::input::{Driver, Event, Listener};
use crate::pads::{Pad, PadRegistry};
use crate::playback::{acquire_handles, PlaybackHandle};
use crate::state::UiState;

/// The highlight duration used when nothing else is configured.
pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_millis(150);

/// What handling an event did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing visible changed.
    Unchanged,
    /// The display needs to be redrawn.
    Changed,
    /// The machine should stop.
    Quit,
}

/// The drum machine. Owns one playback handle per pad for as long as it is
/// mounted, and the UI state derived from triggers.
pub struct DrumMachine {
    registry: PadRegistry,
    handles: HashMap<char, PlaybackHandle>,
    state: UiState,
    highlight: Duration,
    events_tx: UnboundedSender<Event>,
}

impl DrumMachine {
    /// Mounts the drum machine: loads every pad's sample onto the device and
    /// creates the event channel the machine runs on.
    pub fn mount(
        registry: PadRegistry,
        device: Arc<dyn Device>,
        samples_dir: &Path,
        highlight: Duration,
    ) -> (DrumMachine, UnboundedReceiver<Event>) {
        let handles = acquire_handles(&registry, samples_dir, device);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        (
            DrumMachine {
                registry,
                handles,
                state: UiState::new(),
                highlight,
                events_tx,
            },
            events_rx,
        )
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn registry(&self) -> &PadRegistry {
        &self.registry
    }

    /// The playback handle of the pad with the given key.
    pub fn handle(&self, key: char) -> Option<&PlaybackHandle> {
        self.handles.get(&key)
    }

    /// A sender for feeding events into the machine.
    pub fn events(&self) -> UnboundedSender<Event> {
        self.events_tx.clone()
    }

    /// Plays the pad from its first frame, shows its name and highlights it.
    /// Playback problems are only logged: the display updates regardless.
    pub fn trigger(&mut self, pad: &'static Pad) {
        match self.handles.get(&pad.key()) {
            Some(handle) => {
                if let Err(e) = handle.restart() {
                    debug!(pad = pad.id(), err = %e, "Pad did not play.");
                }
            }
            None => debug!(pad = pad.id(), "Pad has no playback handle."),
        }

        self.state.triggered(pad);

        // One timer per trigger, never cancelled. Whichever fires clears the
        // highlight.
        let highlight = self.highlight;
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(highlight).await;
            // The machine may have unmounted in the meantime.
            let _ = events_tx.send(Event::HighlightExpired);
        });

        info!(pad = pad.id(), key = %pad.key(), "Pad triggered.");
    }

    /// Handles a key press. Keys without a pad are ignored.
    pub fn press_key(&mut self, key: char) -> Outcome {
        match self.registry.find_by_key(key) {
            Some(pad) => {
                self.trigger(pad);
                Outcome::Changed
            }
            None => {
                debug!(key = %key, "No pad for key.");
                Outcome::Unchanged
            }
        }
    }

    /// Handles a click on the pad at the given grid position.
    pub fn click(&mut self, index: usize) -> Outcome {
        match self.registry.get(index) {
            Some(pad) => {
                self.trigger(pad);
                Outcome::Changed
            }
            None => Outcome::Unchanged,
        }
    }

    /// Applies one event to the machine.
    pub fn handle_event(&mut self, event: Event) -> Outcome {
        match event {
            Event::Key(key) => self.press_key(key),
            Event::Click(index) => self.click(index),
            Event::HighlightExpired => {
                if self.state.active_key().is_some() {
                    self.state.clear_active();
                    Outcome::Changed
                } else {
                    Outcome::Unchanged
                }
            }
            Event::Redraw => Outcome::Changed,
            Event::Quit => Outcome::Quit,
        }
    }

    /// Runs the machine until the user quits or the driver stops. The input
    /// listener is registered for exactly as long as this runs.
    pub async fn run(
        &mut self,
        driver: Arc<dyn Driver>,
        display: &mut dyn Display,
        events_rx: UnboundedReceiver<Event>,
    ) -> Result<(), Box<dyn Error>> {
        let span = span!(Level::INFO, "drum machine");
        self.process_events(driver, display, events_rx)
            .instrument(span)
            .await
    }

    async fn process_events(
        &mut self,
        driver: Arc<dyn Driver>,
        display: &mut dyn Display,
        mut events_rx: UnboundedReceiver<Event>,
    ) -> Result<(), Box<dyn Error>> {
        let _listener = Listener::start(driver, self.events_tx.clone());
        display.render(&self.state, &self.registry)?;

        info!(pads = self.registry.len(), "Drum machine started.");

        while let Some(event) = events_rx.recv().await {
            match self.handle_event(event) {
                Outcome::Unchanged => {}
                Outcome::Changed => display.render(&self.state, &self.registry)?,
                Outcome::Quit => break,
            }
        }

        info!("Drum machine stopping.");
        Ok(())
    }

    /// Releases every playback handle.
    pub fn unmount(self) {
        let released = self.handles.len();
        drop(self.handles);
        info!(released, "Drum machine unmounted.");
    }
}
