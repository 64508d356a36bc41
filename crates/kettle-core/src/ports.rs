//! Port traits between the kettle state machine and the outside world.
//!
//! ```text
//!   Kettle ──▶ Notifier (console, log file)
//!          └─▶ Recorder (message store)
//! ```
//!
//! The state machine consumes both via generics, so it never touches
//! stdout, the log file or SQLite directly.

use crate::error::DatabaseError;
use crate::events::Event;

/// Shows an event to the user and writes it to the log.
///
/// Implementations must not fail the caller; write errors are theirs to
/// swallow or log.
pub trait Notifier {
    fn notify(&mut self, event: &Event);
}

/// Persists a rendered message with its timestamp.
pub trait Recorder {
    fn record(&mut self, message: &str, timestamp: &str) -> Result<(), DatabaseError>;
}

/// Collects events in memory. Handy for tests and dry runs.
impl Notifier for Vec<Event> {
    fn notify(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Collects `(message, timestamp)` rows in memory.
impl Recorder for Vec<(String, String)> {
    fn record(&mut self, message: &str, timestamp: &str) -> Result<(), DatabaseError> {
        self.push((message.to_string(), timestamp.to_string()));
        Ok(())
    }
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, event: &Event) {
        (**self).notify(event);
    }
}

impl<R: Recorder + ?Sized> Recorder for &mut R {
    fn record(&mut self, message: &str, timestamp: &str) -> Result<(), DatabaseError> {
        (**self).record(message, timestamp)
    }
}
