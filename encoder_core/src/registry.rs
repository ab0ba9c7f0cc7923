//! Fixed-capacity owning registries for encoders and switches.
//!
//! The spec's external interface (§6) addresses encoders and switches by small integer index
//! into a single owning collection, so that no two mutable references to the same slot can be
//! live at once (spec §5). `heapless`-style fixed arrays, sized at compile time, are the direct
//! equivalent of the teacher's `Vec<Track, TRACK_COUNT>` pattern for a `no_std` target with no
//! allocator.

use crate::encoder::{Encoder, EncoderConfig};
use crate::error::CoreError;
use crate::switch::{MidiEventBinding, Polarity, Switch};

pub const ENCODER_CAPACITY: usize = 16;
pub const SWITCH_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct EncoderRegistry {
    encoders: [Encoder; ENCODER_CAPACITY],
}

impl Default for EncoderRegistry {
    fn default() -> Self {
        EncoderRegistry {
            encoders: core::array::from_fn(|_| Encoder::new()),
        }
    }
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setup(&mut self, index: usize, config: EncoderConfig) -> Result<(), CoreError> {
        let e = self.encoders.get_mut(index).ok_or(CoreError::OutOfBounds)?;
        e.setup(config);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Encoder> {
        self.encoders.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Encoder> {
        self.encoders.get_mut(index)
    }

    pub fn value(&self, index: usize) -> Result<u32, CoreError> {
        self.get(index).map(Encoder::value).ok_or(CoreError::OutOfBounds)
    }

    pub fn set_value(&mut self, index: usize, value: u32) -> Result<u32, CoreError> {
        self.get_mut(index)
            .map(|e| e.set_value(value))
            .ok_or(CoreError::OutOfBounds)
    }

    /// Find every encoder bound to the given MIDI channel/controller pair, for inbound CC
    /// rehydration (spec §4.D). Multiple encoders may legitimately share a binding (e.g. a
    /// hardware encoder shadowing a DAW-side fader); all are rehydrated.
    pub fn bound_to_cc(&mut self, chan: u8, ctrl: u8) -> impl Iterator<Item = &mut Encoder> {
        self.encoders
            .iter_mut()
            .filter(move |e| e.enabled && e.midi_chan() == chan && e.midi_ctrl() == ctrl)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Encoder> {
        self.encoders.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Encoder> {
        self.encoders.iter_mut()
    }
}

#[derive(Debug, Clone)]
pub struct SwitchRegistry {
    switches: [Switch; SWITCH_CAPACITY],
}

impl Default for SwitchRegistry {
    fn default() -> Self {
        SwitchRegistry {
            switches: core::array::from_fn(|_| Switch::new()),
        }
    }
}

impl SwitchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setup(&mut self, index: usize, pin: u8, polarity: Polarity) -> Result<(), CoreError> {
        let s = self.switches.get_mut(index).ok_or(CoreError::OutOfBounds)?;
        s.setup(pin, polarity);
        Ok(())
    }

    pub fn setup_midi(&mut self, index: usize, event: MidiEventBinding) -> Result<(), CoreError> {
        let s = self.switches.get_mut(index).ok_or(CoreError::OutOfBounds)?;
        s.setup_midi(event);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Switch> {
        self.switches.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Switch> {
        self.switches.get_mut(index)
    }

    /// `get_switch_dtus` (spec §6): query and consume a completed or in-progress-long press.
    pub fn dtus(&mut self, index: usize, now_us: u64, long_dtus_us: u64) -> Result<u64, CoreError> {
        self.get_mut(index)
            .map(|s| s.query_dtus(now_us, long_dtus_us))
            .ok_or(CoreError::OutOfBounds)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Switch> {
        self.switches.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Switch> {
        self.switches.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::EncoderConfig;

    #[test]
    fn out_of_bounds_index_is_an_error() {
        let mut reg = EncoderRegistry::new();
        let result = reg.setup(
            ENCODER_CAPACITY,
            EncoderConfig {
                pin_a: 0,
                pin_b: 1,
                midi_chan: 0,
                midi_ctrl: 1,
                osc: None,
                value: 0,
                max_value: 10,
                step: 1,
            },
        );
        assert_eq!(result, Err(CoreError::OutOfBounds));
    }

    #[test]
    fn bound_to_cc_finds_matching_encoders() {
        let mut reg = EncoderRegistry::new();
        reg.setup(
            0,
            EncoderConfig {
                pin_a: 0,
                pin_b: 1,
                midi_chan: 2,
                midi_ctrl: 7,
                osc: None,
                value: 0,
                max_value: 127,
                step: 1,
            },
        )
        .unwrap();
        assert_eq!(reg.bound_to_cc(2, 7).count(), 1);
        assert_eq!(reg.bound_to_cc(3, 7).count(), 0);
    }
}
