//! Error kinds for the input core.
//!
//! These are data, not exceptions: the hot path (encoder/switch update) never raises to its
//! transport caller. `CoreError` exists so setup calls and the firmware's logging layer have a
//! name for what went wrong; see spec §7 for the propagation policy.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// Index >= capacity on setup/query.
    OutOfBounds,
    /// I2C/serial open or worker-thread creation failed.
    TransportInit,
    /// A UART payload byte held a reserved framing value.
    FrameCorruption,
    /// A tick/edge arrived inside the debounce window and was dropped.
    SpuriousEdge,
    /// A MIDI/OSC sink returned an error on emission.
    SinkEmission,
}
