//! Input event core: quadrature decoding, velocity-sensitive accumulation, switch debounce,
//! and MIDI/OSC event routing for a rotary-encoder-and-switch control surface.
//!
//! This crate is transport-agnostic — it knows nothing about GPIO registers, I2C, or UART
//! framing. The firmware crate observes raw hardware state, turns it into a
//! [`transport::Observation`], and feeds it to an [`router::EventRouter`]. Kept `no_std` (except
//! under `cfg(test)`, where the host's standard library makes the test suite far more pleasant
//! to write) so the same logic runs unmodified on the target and under `cargo test` on a dev
//! machine.

#![cfg_attr(not(test), no_std)]

pub mod cvgate;
pub mod encoder;
pub mod error;
pub mod registry;
pub mod router;
pub mod switch;
pub mod time;
pub mod transport;

pub use cvgate::CvGateConfig;
pub use encoder::{Direction, Encoder, EncoderConfig, OscBinding};
pub use error::CoreError;
pub use registry::{EncoderRegistry, SwitchRegistry, ENCODER_CAPACITY, SWITCH_CAPACITY};
pub use router::{EventRouter, MidiSink, OscSink};
pub use switch::{MidiEventBinding, MidiEventKind, Polarity, Switch};
pub use transport::{diff_bank, Observation, PinEdge};
