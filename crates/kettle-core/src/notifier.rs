//! Console notifier: prints each event and mirrors it into the log.

use std::io::{self, Write};

use crate::events::{Event, Severity};
use crate::ports::Notifier;

/// Writes event messages line by line and emits a matching `tracing` event.
pub struct ConsoleNotifier<W: Write = io::Stdout> {
    out: W,
}

impl ConsoleNotifier<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    fn notify(&mut self, event: &Event) {
        if let Err(err) = writeln!(self.out, "{event}").and_then(|()| self.out.flush()) {
            tracing::warn!(error = %err, "failed to write notification");
        }

        match (event.severity(), event) {
            (Severity::Error, Event::InvalidAmount { input }) => {
                tracing::error!(input = %input, "{event}");
            }
            (Severity::Error, _) => tracing::error!("{event}"),
            (Severity::Warn, _) => tracing::warn!("{event}"),
            (Severity::Info, _) => tracing::info!("{event}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_event() {
        let mut notifier = ConsoleNotifier::new(Vec::new());
        notifier.notify(&Event::KettleOn);
        notifier.notify(&Event::Temperature { celsius: 24.0 });

        let out = String::from_utf8(notifier.into_inner()).unwrap();
        assert_eq!(out, "Kettle is on.\nTemperature: 24.0\n");
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_do_not_panic() {
        let mut notifier = ConsoleNotifier::new(BrokenPipe);
        notifier.notify(&Event::KettleOff);
    }
}
