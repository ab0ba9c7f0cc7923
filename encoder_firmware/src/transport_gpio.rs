//! Native GPIO wire transport (spec §4.A.1): each encoder's A/B pins and each switch's pin
//! are wired directly to the MCU, one per-pin edge interrupt apiece.

use embedded_hal::digital::v2::InputPin;
use encoder_core::transport::Observation;

/// One encoder's pin pair. Levels are read on every `IO_IRQ_BANK0` firing that touched either
/// pin; `encoder_core::Encoder` itself filters out readings that don't represent a real
/// quadrature transition.
pub struct EncoderPins<A, B> {
    pub index: u8,
    pub pin_a: A,
    pub pin_b: B,
}

impl<A, B> EncoderPins<A, B>
where
    A: InputPin,
    B: InputPin,
{
    /// Read both pins and build the observation the router expects. Pin read errors collapse
    /// to a `0` level; a stuck-low GPIO can't raise an error on this family of MCU, so this
    /// mirrors what a bare register read would already do.
    pub fn observe(&mut self) -> Observation {
        let a = self.pin_a.is_high().unwrap_or(false) as u8;
        let b = self.pin_b.is_high().unwrap_or(false) as u8;
        Observation::EncoderPins {
            index: self.index,
            pin_a_level: a,
            pin_b_level: b,
        }
    }
}

pub struct SwitchPin<P> {
    pub index: u8,
    pub pin: P,
}

impl<P> SwitchPin<P>
where
    P: InputPin,
{
    pub fn observe(&mut self) -> Observation {
        let level = self.pin.is_high().unwrap_or(true) as u8;
        Observation::SwitchLevel {
            index: self.index,
            level,
        }
    }
}
