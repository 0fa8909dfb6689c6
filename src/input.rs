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

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub mod line;
pub mod terminal;

/// Events consumed by the drum machine's event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key went down. Matched against pad keys case-insensitively.
    Key(char),

    /// A pad was clicked, by its index in the registry.
    Click(usize),

    /// A highlight timer fired.
    HighlightExpired,

    /// The display needs to be redrawn, e.g. after a resize.
    Redraw,

    /// The user asked to quit.
    Quit,
}

/// A source of input events.
pub trait Driver: Send + Sync + 'static {
    /// Starts watching for input and sends events until the stop flag is set
    /// or the input ends.
    fn monitor_events(
        &self,
        events_tx: UnboundedSender<Event>,
        stop: Arc<AtomicBool>,
    ) -> JoinHandle<Result<(), io::Error>>;
}

/// The input listener registration. Events flow for as long as the listener
/// lives; dropping it stops the driver.
pub struct Listener {
    stop: Arc<AtomicBool>,
    watcher: JoinHandle<()>,
}

impl Listener {
    /// Starts the driver. When the driver finishes, for any reason, a quit
    /// event is sent.
    pub fn start(driver: Arc<dyn Driver>, events_tx: UnboundedSender<Event>) -> Listener {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = driver.monitor_events(events_tx.clone(), stop.clone());
        let watcher = tokio::spawn(async move {
            match handle.await {
                Ok(Ok(())) => info!("Input driver stopped."),
                Ok(Err(e)) => error!(err = %e, "Input driver failed."),
                Err(e) => error!(err = %e, "Error waiting for input driver to stop."),
            }
            // The receiver is gone once the machine has unmounted.
            let _ = events_tx.send(Event::Quit);
        });

        Listener { stop, watcher }
    }

    /// Returns true once the driver has finished.
    pub fn is_finished(&self) -> bool {
        self.watcher.is_finished()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
