//! OSC outbound adapter.
//!
//! Encoding and transmitting real OSC packets is explicitly out of scope for this firmware
//! (the wire format and network/serial carrier belong to whatever OSC library the host-side
//! integration uses). This adapter satisfies [`encoder_core::OscSink`] by logging what would
//! have been sent, so encoders bound to an OSC path still exercise the full dispatch path on
//! target and during development even before a concrete carrier is wired up.

use defmt::debug;
use encoder_core::{CoreError, OscSink};

#[derive(Default)]
pub struct LoggingOscSink;

impl OscSink for LoggingOscSink {
    fn send_bool(&mut self, path: &str, port: u16, value: bool) -> Result<(), CoreError> {
        debug!("[osc_send] path={} port={} value={}", path, port, value);
        Ok(())
    }

    fn send_int(&mut self, path: &str, port: u16, value: i32) -> Result<(), CoreError> {
        debug!("[osc_send] path={} port={} value={}", path, port, value);
        Ok(())
    }
}
