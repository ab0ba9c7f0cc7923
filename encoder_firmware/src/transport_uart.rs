//! UART wire transport (spec §4.A.3): fixed 4-byte framed packed-bitmap packets.
//!
//! Frame layout: `0xEA`, `payload0`, `payload1`, `0xFB`. The two payload bytes form a 16-bit
//! pin-level bitmap, not a pre-decoded event: each encoder's configured `pin_a`/`pin_b` and each
//! switch's configured pin are reinterpreted as bit indices into this bitmap (`byte = pin/8`,
//! `bit = pin%8`), the same way native GPIO reinterprets them as physical pin numbers. A single
//! frame can therefore carry fresh levels for several encoders and switches at once. Any payload
//! byte equal to a reserved value (`0xEA`, `0xFB`, `0xFF`) indicates a corrupted frame rather than
//! real data.

use encoder_core::registry::{EncoderRegistry, SwitchRegistry};
use encoder_core::transport::Observation;
use encoder_core::CoreError;
use heapless::Vec as HVec;

const FRAME_START: u8 = 0xEA;
const FRAME_END: u8 = 0xFB;
const RESERVED: [u8; 3] = [0xEA, 0xFB, 0xFF];

/// Worst case: one observation per configured encoder plus one per configured switch.
pub const MAX_FRAME_OBSERVATIONS: usize = 32;

fn is_reserved(byte: u8) -> bool {
    RESERVED.contains(&byte)
}

fn bit(bank: u16, pin: u8) -> u8 {
    ((bank >> (pin % 16)) & 1) as u8
}

/// Parses one complete 4-byte frame already extracted from the UART byte stream, resolving its
/// packed bitmap against every enabled encoder's/switch's configured pin numbers. Returns
/// `Err(CoreError::FrameCorruption)` if a reserved byte appears where payload is expected, or if
/// the frame markers don't match.
pub fn parse_frame(
    frame: [u8; 4],
    encoders: &EncoderRegistry,
    switches: &SwitchRegistry,
) -> Result<HVec<Observation, MAX_FRAME_OBSERVATIONS>, CoreError> {
    let [start, payload0, payload1, end] = frame;
    if start != FRAME_START || end != FRAME_END {
        return Err(CoreError::FrameCorruption);
    }
    if is_reserved(payload0) || is_reserved(payload1) {
        return Err(CoreError::FrameCorruption);
    }
    let bank = payload0 as u16 | ((payload1 as u16) << 8);

    let mut observations = HVec::new();
    for (index, encoder) in encoders.iter().enumerate() {
        if !encoder.enabled {
            continue;
        }
        observations
            .push(Observation::EncoderPins {
                index: index as u8,
                pin_a_level: bit(bank, encoder.pin_a()),
                pin_b_level: bit(bank, encoder.pin_b()),
            })
            .ok();
    }
    for (index, switch) in switches.iter().enumerate() {
        if !switch.enabled {
            continue;
        }
        observations
            .push(Observation::SwitchLevel {
                index: index as u8,
                level: bit(bank, switch.pin()),
            })
            .ok();
    }
    Ok(observations)
}

/// Byte-at-a-time frame synchronizer: feed it UART bytes one at a time as they arrive on the
/// RX interrupt; it yields a complete frame once it has resynchronized on a `FRAME_START` and
/// collected a full 4 bytes ending in `FRAME_END`.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: [u8; 4],
    len: usize,
}

impl FrameReader {
    pub fn new() -> Self {
        FrameReader::default()
    }

    pub fn push_byte(&mut self, byte: u8) -> Option<[u8; 4]> {
        if self.len == 0 && byte != FRAME_START {
            return None; // not yet resynchronized
        }
        self.buf[self.len] = byte;
        self.len += 1;
        if self.len == 4 {
            let frame = self.buf;
            self.len = 0;
            Some(frame)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoder_core::encoder::EncoderConfig;
    use encoder_core::switch::Polarity;

    fn registry_with_encoder(pin_a: u8, pin_b: u8) -> (EncoderRegistry, SwitchRegistry) {
        let mut encoders = EncoderRegistry::new();
        encoders
            .setup(
                0,
                EncoderConfig {
                    pin_a,
                    pin_b,
                    midi_chan: 0,
                    midi_ctrl: 1,
                    osc: None,
                    value: 10,
                    max_value: 100,
                    step: 1,
                },
            )
            .unwrap();
        (encoders, SwitchRegistry::new())
    }

    #[test]
    fn resolves_encoder_pin_levels_from_bitmap() {
        let (encoders, switches) = registry_with_encoder(1, 2);
        // bit 1 set (pin_a), bit 2 clear (pin_b)
        let observations = parse_frame([0xEA, 0x02, 0x00, 0xFB], &encoders, &switches).unwrap();
        assert_eq!(observations.len(), 1);
        assert!(matches!(
            observations[0],
            Observation::EncoderPins { index: 0, pin_a_level: 1, pin_b_level: 0 }
        ));
    }

    #[test]
    fn resolves_switch_level_from_bitmap() {
        let encoders = EncoderRegistry::new();
        let mut switches = SwitchRegistry::new();
        switches.setup(0, 3, Polarity::ActiveLow).unwrap();
        // bit 3 set
        let observations = parse_frame([0xEA, 0x08, 0x00, 0xFB], &encoders, &switches).unwrap();
        assert_eq!(observations.len(), 1);
        assert!(matches!(observations[0], Observation::SwitchLevel { index: 0, level: 1 }));
    }

    #[test]
    fn single_frame_carries_both_an_encoder_and_a_switch() {
        let (encoders, mut switches) = registry_with_encoder(1, 2);
        switches.setup(0, 4, Polarity::ActiveLow).unwrap();
        // bits 1 and 4 set: pin_a high, switch pin high; pin_b (bit 2) clear
        let observations = parse_frame([0xEA, 0x12, 0x00, 0xFB], &encoders, &switches).unwrap();
        assert_eq!(observations.len(), 2);
        assert!(observations
            .iter()
            .any(|o| matches!(o, Observation::EncoderPins { index: 0, pin_a_level: 1, pin_b_level: 0 })));
        assert!(observations
            .iter()
            .any(|o| matches!(o, Observation::SwitchLevel { index: 0, level: 1 })));
    }

    #[test]
    fn reserved_payload_byte_is_corruption() {
        let encoders = EncoderRegistry::new();
        let switches = SwitchRegistry::new();
        assert_eq!(
            parse_frame([0xEA, 0xFF, 0x00, 0xFB], &encoders, &switches),
            Err(CoreError::FrameCorruption)
        );
    }

    #[test]
    fn bad_markers_are_corruption() {
        let encoders = EncoderRegistry::new();
        let switches = SwitchRegistry::new();
        assert_eq!(
            parse_frame([0x00, 0x00, 0x00, 0xFB], &encoders, &switches),
            Err(CoreError::FrameCorruption)
        );
    }

    #[test]
    fn frame_reader_resyncs_after_garbage() {
        let mut r = FrameReader::new();
        assert_eq!(r.push_byte(0x55), None); // garbage before sync
        assert_eq!(r.push_byte(0xEA), None);
        assert_eq!(r.push_byte(0x00), None);
        assert_eq!(r.push_byte(0x01), None);
        assert_eq!(r.push_byte(0xFB), Some([0xEA, 0x00, 0x01, 0xFB]));
    }

    #[test]
    fn scenario_frame_drives_encoder_down_one_step() {
        // spec §8 scenario 5: encoder 0 bound to pin_a=1, pin_b=2. Prime the encoder's last
        // observed pin state to (1,1) (the Down/CCW quadrature sequence runs ...->11->10->...),
        // then feed the literal scenario frame and expect value to decrease by one step.
        let (mut encoders, switches) = registry_with_encoder(1, 2);
        encoders.get_mut(0).unwrap().observe_pins(1, 1, 1_000);

        let observations = parse_frame([0xEA, 0x02, 0x00, 0xFB], &encoders, &switches).unwrap();
        let mut applied = None;
        for obs in observations.iter() {
            if let Observation::EncoderPins { index, pin_a_level, pin_b_level } = *obs {
                applied = encoders
                    .get_mut(index as usize)
                    .and_then(|e| e.observe_pins(pin_a_level, pin_b_level, 4_000));
            }
        }
        assert_eq!(applied, Some(9));
        assert_eq!(encoders.get(0).unwrap().value(), 9);
    }
}
