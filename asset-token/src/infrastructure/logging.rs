//! Helpers for our tracing spans.

use std::fmt::Display;
use tracing::{field, warn, Span};

/// Records `field_value` under `field_name` on the current span so every
/// event emitted inside the span carries it. The value is recorded in its
/// `Display` form, so strings show up without quotes.
///
/// The field has to be declared on the span up front, e.g. with
/// `#[instrument(fields(serial_number))]`. Debug builds warn when it is not.
pub fn record_field(field_name: &str, field_value: &dyn Display) {
    let span = Span::current();
    if cfg!(debug_assertions) && !span.has_field(field_name) {
        warn!(field_name, "Span field was not declared before recording");
    }

    let _ = span.record(field_name, &field::display(field_value));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        io,
        sync::{Arc, Mutex},
    };
    use tracing::info_span;

    /// Collects everything the fmt subscriber writes.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn string_field_is_recorded_without_quotes() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let span = info_span!("handle_request", serial_number = field::Empty);
            let _entered = span.enter();
            record_field("serial_number", &"A1B2C3");
            tracing::info!("Recorded");
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("serial_number=A1B2C3"), "{output}");
        assert!(!output.contains('"'), "{output}");
    }
}
