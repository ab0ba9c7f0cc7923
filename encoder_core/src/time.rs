//! Monotonic microsecond timestamps.
//!
//! The core never reads a clock itself — every transport hands in `now_us`, a microsecond
//! count from whatever monotonic source the firmware wires up (RTIC's monotonic timer on the
//! target, `std::time::Instant` in host tests). Using a plain `u64` rather than a typed instant
//! keeps this crate clock-source-agnostic, matching how the teacher's `Sequencer::advance`
//! takes `now_us: u64` rather than depending on a concrete monotonic type.

pub type MicrosTimestamp = u64;

/// Minimum time between two accepted encoder ticks or two switch edges, per the spec's
/// debounce requirement. 1ms rejects mechanical contact bounce without perceptibly slowing a
/// fast spin (ticks arrive well under this on a fast flick, but bounce on a single physical
/// transition arrives much faster still).
pub const DEBOUNCE_US: u64 = 1_000;
