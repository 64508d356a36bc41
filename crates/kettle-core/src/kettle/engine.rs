//! Kettle state machine.
//!
//! The kettle is a synchronous, turn-based state machine. Every command runs
//! to completion before returning, and each state change is pushed through
//! the [`Notifier`] and, for recorded events, the [`Recorder`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Filled -> Heating -> Boiled -> Idle
//!   any -> Off
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut kettle = Kettle::new(spec, ConsoleNotifier::stdout(), db);
//! kettle.pour_water(0.5)?;
//! kettle.turn_on(); // heats, boils and empties the kettle
//! ```

use std::ops::ControlFlow;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::spec::{KettleSpec, StepDelay, AMBIENT_TEMP};
use crate::error::PourError;
use crate::events::Event;
use crate::ports::{Notifier, Recorder};
use crate::storage::database::TIMESTAMP_FORMAT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KettleState {
    /// Empty and cold.
    Idle,
    /// Holds water, not heating.
    Filled,
    Heating,
    /// Reached `max_temp`; left immediately for `Idle` once the water is used.
    Boiled,
    /// Switched off. Ends the session but keeps water and temperature.
    Off,
}

/// Result of a well-formed pour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PourOutcome {
    Accepted { total: f64 },
    /// The pour would overflow the kettle; nothing changed.
    Rejected,
}

/// Result of switching the kettle on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOnOutcome {
    /// Kettle was empty.
    NoWater,
    /// Full heat cycle ran; `steps` temperature readings were emitted.
    Cycled { steps: u32 },
    /// The cancel flag was raised mid-boil. The kettle is left `Heating`
    /// with its water and last reading.
    Interrupted { steps: u32 },
}

/// Point-in-time view of the kettle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KettleSnapshot {
    pub state: KettleState,
    pub water_amount: f64,
    pub current_temp: f64,
    pub spec: KettleSpec,
}

/// A single kettle and its collaborators.
///
/// All mutable state lives on the instance; two kettles never share water.
pub struct Kettle<N, R> {
    spec: KettleSpec,
    state: KettleState,
    current_temp: f64,
    water_amount: f64,
    step_delay: StepDelay,
    cancel: Option<Arc<AtomicBool>>,
    notifier: N,
    recorder: R,
}

impl<N: Notifier, R: Recorder> Kettle<N, R> {
    /// Create an empty kettle at ambient temperature.
    pub fn new(spec: KettleSpec, notifier: N, recorder: R) -> Self {
        Self {
            spec,
            state: KettleState::Idle,
            current_temp: AMBIENT_TEMP,
            water_amount: 0.0,
            step_delay: StepDelay::default(),
            cancel: None,
            notifier,
            recorder,
        }
    }

    /// Sleep this long per simulated second while boiling.
    pub fn with_step_delay(mut self, delay: StepDelay) -> Self {
        self.step_delay = delay;
        self
    }

    /// Abandon a running boil once `cancel` is set.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> KettleState {
        self.state
    }

    pub fn spec(&self) -> &KettleSpec {
        &self.spec
    }

    pub fn water_amount(&self) -> f64 {
        self.water_amount
    }

    pub fn current_temp(&self) -> f64 {
        self.current_temp
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn snapshot(&self) -> KettleSnapshot {
        KettleSnapshot {
            state: self.state,
            water_amount: self.water_amount,
            current_temp: self.current_temp,
            spec: self.spec,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Parse user text as an amount of water and pour it.
    ///
    /// Accepts `,` as a decimal separator.
    ///
    /// # Errors
    /// Returns [`PourError::InvalidAmount`] if the text is not a
    /// non-negative finite number.
    pub fn pour_water_input(&mut self, input: &str) -> Result<PourOutcome, PourError> {
        let trimmed = input.trim();
        match trimmed.replace(',', ".").parse::<f64>() {
            Ok(amount) => self.pour_checked(amount, trimmed),
            Err(_) => Err(self.reject_amount(trimmed)),
        }
    }

    /// Pour `amount` litres into the kettle.
    ///
    /// Overflowing pours are rejected with a notification and leave the
    /// kettle untouched.
    ///
    /// # Errors
    /// Returns [`PourError::InvalidAmount`] for negative or non-finite amounts.
    pub fn pour_water(&mut self, amount: f64) -> Result<PourOutcome, PourError> {
        self.pour_checked(amount, &amount.to_string())
    }

    /// Switch the kettle on.
    ///
    /// With water in it, runs the full cycle synchronously: heat, boil,
    /// use the water, and return to `Idle`. A raised cancel flag stops the
    /// cycle between readings.
    pub fn turn_on(&mut self) -> TurnOnOutcome {
        if self.water_amount == 0.0 {
            self.emit(Event::AddWater);
            return TurnOnOutcome::NoWater;
        }

        self.state = KettleState::Heating;
        self.emit(Event::KettleOn);
        match self.boil() {
            ControlFlow::Continue(steps) => {
                self.boiled();
                TurnOnOutcome::Cycled { steps }
            }
            ControlFlow::Break(steps) => {
                tracing::info!(steps, temp = self.current_temp, "heating interrupted");
                TurnOnOutcome::Interrupted { steps }
            }
        }
    }

    /// Switch the kettle off and end the session.
    pub fn turn_off(&mut self) -> ControlFlow<()> {
        self.state = KettleState::Off;
        self.emit(Event::KettleOff);
        ControlFlow::Break(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn pour_checked(&mut self, amount: f64, input: &str) -> Result<PourOutcome, PourError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(self.reject_amount(input));
        }

        let total = self.water_amount + amount;
        if total > self.spec.volume {
            self.emit(Event::TooMuchWater {
                requested: amount,
                total: self.water_amount,
                volume: self.spec.volume,
            });
            return Ok(PourOutcome::Rejected);
        }

        self.water_amount = total;
        if self.water_amount > 0.0 && matches!(self.state, KettleState::Idle | KettleState::Off) {
            self.state = KettleState::Filled;
        }
        self.emit(Event::WaterPoured { total });
        Ok(PourOutcome::Accepted { total })
    }

    fn reject_amount(&mut self, input: &str) -> PourError {
        self.emit(Event::InvalidAmount {
            input: input.to_string(),
        });
        PourError::InvalidAmount {
            input: input.to_string(),
        }
    }

    /// Heat until `max_temp`, one reading per simulated second.
    ///
    /// The loop is driven by the tick count, so a fresh kettle always emits
    /// exactly `boiling_time` readings. They never decrease, and rise
    /// strictly unless the per-step increment is below float resolution.
    /// Breaks with the readings emitted so far when cancelled.
    fn boil(&mut self) -> ControlFlow<u32, u32> {
        let start = self.current_temp;
        let max_temp = self.spec.max_temp;
        if start >= max_temp {
            return ControlFlow::Continue(0);
        }
        let boiling_time = self.spec.boiling_time;
        let temp_diff = max_temp - start;

        for tick in 0..boiling_time {
            self.current_temp = start + temp_diff * f64::from(tick) / f64::from(boiling_time);
            self.emit(Event::Temperature {
                celsius: self.current_temp,
            });
            if self.step_delay.wait(self.cancel.as_deref()).is_break() {
                return ControlFlow::Break(tick + 1);
            }
        }
        self.current_temp = max_temp;
        ControlFlow::Continue(boiling_time)
    }

    fn boiled(&mut self) {
        self.state = KettleState::Boiled;
        self.emit(Event::Boiled);
        self.stop();
    }

    fn stop(&mut self) {
        self.current_temp = AMBIENT_TEMP;
        self.water_amount = 0.0;
        self.state = KettleState::Idle;
        self.emit(Event::UsedUp);
    }

    fn emit(&mut self, event: Event) {
        self.notifier.notify(&event);
        if !event.is_recorded() {
            return;
        }
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        if let Err(err) = self.recorder.record(&event.to_string(), &timestamp) {
            tracing::warn!(error = %err, "failed to record kettle message");
        }
    }
}
