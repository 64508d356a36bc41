//! Interactive kettle session.
//!
//! Reads commands line by line and drives the kettle until it is switched
//! off, stdin closes, or the user presses Ctrl-C. Both of the latter switch
//! the kettle off as well. Ctrl-C during a paced boil stops it between
//! readings.

use std::future::Future;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Args;
use kettle_core::storage::Database;
use kettle_core::{Config, ConsoleNotifier, Kettle, Notifier, Recorder, TurnOnOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::logging;

const MENU_PROMPT: &str = "Enter a command. 1 - pour water, 2 - boil, 3 - turn off: ";

/// Overrides for the configured kettle. Unset flags keep the config values.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Boiling threshold
    #[arg(long)]
    pub max_temp: Option<f64>,
    /// Capacity in litres
    #[arg(long)]
    pub volume: Option<f64>,
    /// Seconds to reach the boiling threshold
    #[arg(long)]
    pub boiling_time: Option<u32>,
    /// Real milliseconds per simulated second
    #[arg(long)]
    pub step_delay_ms: Option<u64>,
}

impl RunArgs {
    fn apply_to(&self, config: &mut Config) {
        if let Some(max_temp) = self.max_temp {
            config.kettle.max_temp = max_temp;
        }
        if let Some(volume) = self.volume {
            config.kettle.volume = volume;
        }
        if let Some(boiling_time) = self.boiling_time {
            config.kettle.boiling_time = boiling_time;
        }
        if let Some(ms) = self.step_delay_ms {
            config.simulation.step_delay_ms = ms;
        }
    }
}

/// One line of user input at the menu prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    PourWater,
    TurnOn,
    TurnOff,
}

impl ReplCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "pour" => Some(Self::PourWater),
            "2" | "on" => Some(Self::TurnOn),
            "3" | "off" => Some(Self::TurnOff),
            _ => None,
        }
    }
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    TurnedOff,
    Interrupted,
    InputClosed,
}

enum Input {
    Line(String),
    Interrupted,
    Closed,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    args.apply_to(&mut config);
    let spec = config.kettle_spec()?;

    let log_path = logging::init(&config.logging)?;
    tracing::info!(
        log = %log_path.display(),
        max_temp = spec.max_temp,
        volume = spec.volume,
        boiling_time = spec.boiling_time,
        "kettle session starting"
    );

    let db = Database::open()?;
    let cancel = Arc::new(AtomicBool::new(false));
    let mut kettle = Kettle::new(spec, ConsoleNotifier::stdout(), db)
        .with_step_delay(config.step_delay())
        .with_cancel_flag(Arc::clone(&cancel));

    // The boil blocks the session thread, so the cancel flag is raised from
    // a worker.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    runtime.spawn(raise_on_interrupt(cancel));
    let result = runtime.block_on(session(
        &mut kettle,
        BufReader::new(tokio::io::stdin()),
        interrupt(),
    ));
    // stdin is read on a blocking thread that may still be waiting for input.
    runtime.shutdown_background();

    let end = result?;
    tracing::info!(?end, "kettle session finished");
    Ok(())
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupt() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

async fn raise_on_interrupt(cancel: Arc<AtomicBool>) {
    interrupt().await;
    cancel.store(true, Ordering::SeqCst);
}

/// Drive `kettle` from `input` until it is switched off.
///
/// `interrupt` resolving, `input` reaching EOF, or a boil cut short by the
/// kettle's cancel flag switches the kettle off.
pub async fn session<N, R, I, F>(
    kettle: &mut Kettle<N, R>,
    input: I,
    interrupt: F,
) -> io::Result<SessionEnd>
where
    N: Notifier,
    R: Recorder,
    I: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        let line = match next_input(&mut lines, &mut interrupt, MENU_PROMPT).await? {
            Input::Line(line) => line,
            Input::Interrupted => return Ok(shut_down(kettle, SessionEnd::Interrupted)),
            Input::Closed => return Ok(shut_down(kettle, SessionEnd::InputClosed)),
        };

        match ReplCommand::parse(&line) {
            Some(ReplCommand::PourWater) => {
                let prompt = format!(
                    "Amount of water (no more than {} l): ",
                    kettle.spec().volume
                );
                match next_input(&mut lines, &mut interrupt, &prompt).await? {
                    Input::Line(amount) => {
                        if let Err(err) = kettle.pour_water_input(&amount) {
                            tracing::debug!(error = %err, "pour rejected");
                        }
                    }
                    Input::Interrupted => {
                        return Ok(shut_down(kettle, SessionEnd::Interrupted));
                    }
                    Input::Closed => return Ok(shut_down(kettle, SessionEnd::InputClosed)),
                }
            }
            Some(ReplCommand::TurnOn) => {
                if let TurnOnOutcome::Interrupted { .. } = kettle.turn_on() {
                    println!();
                    return Ok(shut_down(kettle, SessionEnd::Interrupted));
                }
            }
            Some(ReplCommand::TurnOff) => {
                if kettle.turn_off().is_break() {
                    return Ok(SessionEnd::TurnedOff);
                }
            }
            None => tracing::debug!(input = %line.trim(), "ignoring unknown command"),
        }
    }
}

async fn next_input<I, F>(
    lines: &mut tokio::io::Lines<I>,
    interrupt: &mut std::pin::Pin<&mut F>,
    prompt: &str,
) -> io::Result<Input>
where
    I: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    tokio::select! {
        line = lines.next_line() => Ok(match line? {
            Some(line) => Input::Line(line),
            None => {
                println!();
                Input::Closed
            }
        }),
        () = interrupt.as_mut() => {
            println!();
            Ok(Input::Interrupted)
        }
    }
}

fn shut_down<N: Notifier, R: Recorder>(kettle: &mut Kettle<N, R>, end: SessionEnd) -> SessionEnd {
    let flow = kettle.turn_off();
    tracing::info!(?end, stopped = flow.is_break(), "kettle switched off");
    end
}
