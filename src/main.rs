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
use clap::{crate_version, Parser, Subcommand};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::backend::CrosstermBackend;
use std::error::Error;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;
use tracing_subscriber::EnvFilter;

use drumpad::audio::{self, loader::resolve_source};
use drumpad::config::{Interface, Player};
use drumpad::display;
use drumpad::input::{self, Event};
use drumpad::machine::DrumMachine;
use drumpad::pads::PadRegistry;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A nine pad drum machine for the terminal."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start will start the drum machine.
    Start {
        /// The path to the player config.
        #[arg[short, long]]
        config: Option<PathBuf>,
        /// Overrides the configured interface.
        #[arg[short, long, value_enum]]
        interface: Option<Interface>,
        /// Writes logs to this file. The terminal interface logs nothing otherwise.
        #[arg[short, long]]
        log_file: Option<PathBuf>,
    },
    /// Lists the pads and the sample file each one plays.
    Pads {
        /// The path to the player config.
        #[arg[short, long]]
        config: Option<PathBuf>,
    },
    /// Lists the available audio output devices.
    Devices {},
    /// Prints the default player config to stdout.
    Config {},
}

fn load_player(path: Option<&Path>) -> Result<Player, Box<dyn Error>> {
    Ok(match path {
        Some(path) => Player::load(path)?,
        None => Player::default(),
    })
}

/// Sets up logging. The terminal interface owns the screen, so it only logs
/// to a file.
fn init_logging(
    interface: Option<Interface>,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match (log_file, interface) {
        (Some(path), _) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(File::create(path)?))
            .init(),
        (None, Some(Interface::Terminal)) => {}
        (None, _) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
    Ok(())
}

async fn run_terminal(
    machine: &mut DrumMachine,
    events_rx: UnboundedReceiver<Event>,
) -> Result<(), Box<dyn Error>> {
    let mut display = display::terminal::Display::new(CrosstermBackend::new(io::stdout()))?;
    machine
        .run(
            Arc::new(input::terminal::Driver::new()),
            &mut display,
            events_rx,
        )
        .await
}

async fn run_line(
    machine: &mut DrumMachine,
    events_rx: UnboundedReceiver<Event>,
) -> Result<(), Box<dyn Error>> {
    let mut display = display::line::Display::new(io::stdout());
    let driver = Arc::new(input::line::Driver::new(*machine.registry()));
    machine.run(driver, &mut display, events_rx).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            config,
            interface,
            log_file,
        } => {
            let mut player = load_player(config.as_deref())?;
            if let Some(interface) = interface {
                player.set_interface(interface);
            }
            init_logging(Some(player.interface()), log_file.as_deref())?;

            let device = audio::get_device(player.audio())?;
            let (mut machine, events_rx) = DrumMachine::mount(
                PadRegistry::default(),
                device,
                &player.samples_dir(),
                player.highlight()?,
            );

            info!(interface = ?player.interface(), "Starting drum machine.");
            match player.interface() {
                Interface::Terminal => {
                    ratatui::init();
                    let result = match execute!(io::stdout(), EnableMouseCapture) {
                        Ok(()) => run_terminal(&mut machine, events_rx).await,
                        Err(e) => Err(e.into()),
                    };
                    // Restore the terminal before any error is printed.
                    let _ = execute!(io::stdout(), DisableMouseCapture);
                    ratatui::restore();
                    result?;
                }
                Interface::Line => run_line(&mut machine, events_rx).await?,
            }

            machine.unmount();
        }
        Commands::Pads { config } => {
            init_logging(None, None)?;
            let player = load_player(config.as_deref())?;
            let samples_dir = player.samples_dir();

            println!("Pads (samples: {}):", samples_dir.display());
            for pad in PadRegistry::default().iter() {
                let path = resolve_source(&samples_dir, pad.audio_source());
                let status = if path.is_file() { "found" } else { "missing" };
                println!(
                    "- [{}] {} ({}): {} ({})",
                    pad.key(),
                    pad.name(),
                    pad.id(),
                    path.display(),
                    status
                );
            }
        }
        Commands::Devices {} => {
            init_logging(None, None)?;
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Config {} => {
            println!("{}", Player::default().to_yaml()?);
        }
    }

    Ok(())
}
