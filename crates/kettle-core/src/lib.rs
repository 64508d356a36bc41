//! # Kettle Core Library
//!
//! This library provides the core logic of the kettle simulator. The CLI
//! binary is a thin layer over it: it parses commands and wires the
//! collaborators, while every rule about water and temperature lives here.
//!
//! ## Architecture
//!
//! - **Kettle**: A synchronous state machine that pours, heats, boils and
//!   empties the kettle, emitting an [`Event`] for every state change
//! - **Ports**: [`Notifier`] and [`Recorder`] traits the kettle talks through
//! - **Storage**: SQLite-based message store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Kettle`]: Core kettle state machine
//! - [`ConsoleNotifier`]: Prints events and mirrors them into the log
//! - [`Database`]: Message persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod kettle;
pub mod notifier;
pub mod ports;
pub mod storage;

pub use error::{ConfigError, CoreError, DatabaseError, PourError, ValidationError};
pub use events::{Event, Severity};
pub use kettle::{
    Kettle, KettleSnapshot, KettleSpec, KettleState, PourOutcome, StepDelay, TurnOnOutcome,
    AMBIENT_TEMP,
};
pub use notifier::ConsoleNotifier;
pub use ports::{Notifier, Recorder};
pub use storage::{Config, Database, MessageRecord};
