use std::fmt;

use serde::{Deserialize, Serialize};

/// Every state change of the kettle produces an Event.
/// Notifiers render it for the user; the recorder persists the ones
/// that describe what the kettle actually did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Water was accepted; `total` is the new amount in the kettle.
    WaterPoured { total: f64 },
    /// Pour rejected because it would overflow the kettle.
    TooMuchWater {
        requested: f64,
        total: f64,
        volume: f64,
    },
    /// Pour input was negative or not a number.
    InvalidAmount { input: String },
    /// Turn-on requested with an empty kettle.
    AddWater,
    KettleOn,
    Temperature { celsius: f64 },
    Boiled,
    /// Water consumed and kettle back at ambient temperature.
    UsedUp,
    KettleOff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Event {
    pub fn severity(&self) -> Severity {
        match self {
            Event::InvalidAmount { .. } => Severity::Error,
            Event::TooMuchWater { .. } | Event::AddWater => Severity::Warn,
            _ => Severity::Info,
        }
    }

    /// Whether the event is written to the message store.
    ///
    /// Rejections are shown to the user but never persisted.
    pub fn is_recorded(&self) -> bool {
        !matches!(
            self,
            Event::TooMuchWater { .. } | Event::InvalidAmount { .. } | Event::AddWater
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::WaterPoured { total } => {
                write!(f, "There is {total:.1} l of water in the kettle.")
            }
            Event::TooMuchWater { .. } => f.write_str("Too much water."),
            Event::InvalidAmount { .. } => {
                f.write_str("Amount of water must be a positive number.")
            }
            Event::AddWater => f.write_str("Pour some water into the kettle."),
            Event::KettleOn => f.write_str("Kettle is on."),
            Event::Temperature { celsius } => write!(f, "Temperature: {celsius:.1}"),
            Event::Boiled => f.write_str("Kettle has boiled."),
            Event::UsedUp => f.write_str("Kettle used. Water is used up."),
            Event::KettleOff => f.write_str("Kettle is off."),
        }
    }
}
