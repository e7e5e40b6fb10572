//! pulsegrid - generative drum-sample sequencer.
//!
//! Usage:
//!   pulsegrid -d samples/ -b 124 -p 6 -l
//!   pulsegrid -d samples/ --render out.wav --seconds 30

mod cli;

use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use pg_master::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_RENDER_SECONDS: u32 = 30;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctrl = Controller::new(cli.session_config());
    info!(config = ?ctrl.config(), "starting");

    match &cli.render {
        Some(path) => {
            let seconds = cli.seconds.unwrap_or(DEFAULT_RENDER_SECONDS);
            let frames = ctrl.render_to_wav(path, cli.rate, seconds)?;
            println!("Rendered {frames} frames to {}", path.display());
        }
        None => play(&mut ctrl, cli.seconds)?,
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Play live, printing the pattern whenever LFO drift changes it.
fn play(ctrl: &mut Controller, seconds: Option<u32>) -> Result<(), Box<dyn Error>> {
    let initial = ctrl.play()?;
    println!("{initial}\n");
    println!("Press Ctrl+C to exit");

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s as u64));
    loop {
        if let Some(pattern) = ctrl.poll_pattern() {
            println!("{pattern}\n");
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        thread::sleep(POLL_INTERVAL);
    }

    if let Some(stats) = ctrl.stats() {
        info!(
            triggers = stats.total_triggers(),
            active_voices = stats.active_voices(),
            "stopping"
        );
    }
    ctrl.stop();
    Ok(())
}
