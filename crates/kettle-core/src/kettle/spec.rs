use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Water temperature the kettle starts at and returns to after use.
pub const AMBIENT_TEMP: f64 = 24.0;

/// Physical constants of a kettle. Fixed for the kettle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KettleSpec {
    /// Boiling threshold.
    pub max_temp: f64,
    /// Capacity in litres.
    pub volume: f64,
    /// Seconds to reach `max_temp` from ambient.
    pub boiling_time: u32,
}

impl KettleSpec {
    /// Build a validated spec.
    ///
    /// # Errors
    /// Returns an error if `volume` is not a positive finite number,
    /// `max_temp` is not finite, or `boiling_time` is zero.
    pub fn new(max_temp: f64, volume: f64, boiling_time: u32) -> Result<Self, ValidationError> {
        let spec = Self {
            max_temp,
            volume,
            boiling_time,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.max_temp.is_finite() {
            return Err(invalid("max_temp", "must be a finite number"));
        }
        if !self.volume.is_finite() || self.volume <= 0.0 {
            return Err(invalid("volume", "must be greater than zero"));
        }
        if self.boiling_time == 0 {
            return Err(invalid("boiling_time", "must be at least one second"));
        }
        Ok(())
    }
}

impl Default for KettleSpec {
    fn default() -> Self {
        Self {
            max_temp: 100.0,
            volume: 1.0,
            boiling_time: 10,
        }
    }
}

fn invalid(field: &str, message: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        message: message.into(),
    }
}

/// Longest uninterrupted sleep while waiting out a step.
const WAIT_SLICE: Duration = Duration::from_millis(50);

/// How long one simulated second takes in real time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepDelay(pub Duration);

impl StepDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }

    pub fn is_instant(&self) -> bool {
        self.0.is_zero()
    }

    /// Sleep for one step. Breaks early once `cancel` is raised.
    pub(crate) fn wait(&self, cancel: Option<&AtomicBool>) -> ControlFlow<()> {
        let cancelled = || cancel.is_some_and(|flag| flag.load(Ordering::SeqCst));
        let mut remaining = self.0;
        while !remaining.is_zero() {
            if cancelled() {
                return ControlFlow::Break(());
            }
            let slice = remaining.min(WAIT_SLICE);
            std::thread::sleep(slice);
            remaining -= slice;
        }
        if cancelled() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
