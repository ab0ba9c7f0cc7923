//! I2C port-expander wire transport (spec §4.A.2): encoders and switches are wired to an
//! MCP23017, polled on its bank-interrupt pin rather than per-pin MCU interrupts.

use encoder_core::transport::{diff_bank, Observation, PinEdge};
use mcp23017::{Port, MCP23017};

/// Reads both GPIO banks, diffs against the previous read, and maps the resulting pin edges to
/// encoder/switch observations using a caller-supplied pin map. `pin_map` answers "what is
/// wired to expander pin N" the same way `peripherals::setup` answers it for native GPIO.
pub struct ExpanderPoller<I2C> {
    mcp: MCP23017<I2C>,
    last_bank: u16,
}

/// What a single MCP23017 pin is wired to.
#[derive(Debug, Clone, Copy)]
pub enum PinRole {
    EncoderA(u8),
    EncoderB(u8),
    Switch(u8),
    Unused,
}

impl<I2C, E> ExpanderPoller<I2C>
where
    I2C: embedded_hal::blocking::i2c::WriteRead<Error = E> + embedded_hal::blocking::i2c::Write<Error = E>,
{
    pub fn new(mcp: MCP23017<I2C>) -> Self {
        ExpanderPoller { mcp, last_bank: 0 }
    }

    /// Call once, from the bank-interrupt handler. Reads both GPIO registers, diffs against the
    /// last known state, and returns every resulting pin-level edge still needing resolution
    /// into an `Observation` via `resolve_pin`.
    pub fn read_edges(&mut self) -> Result<heapless::Vec<PinEdge, 16>, mcp23017::Error<E>> {
        let gpioa = self.mcp.read_gpio(Port::GPIOA)?;
        let gpiob = self.mcp.read_gpio(Port::GPIOB)?;
        let current = (gpioa as u16) | ((gpiob as u16) << 8);
        let edges = diff_bank(self.last_bank, current).collect();
        self.last_bank = current;
        Ok(edges)
    }
}

/// Resolve a single expander pin edge against the wiring map into a router observation.
/// Direction-bearing pin pairs (the two halves of one encoder) only resolve once both halves'
/// latest levels are known, so this module tracks each encoder's last-seen A/B pair alongside
/// the expander's own bank state.
pub fn resolve_pin(role: PinRole, level: u8, pin_a_level_cache: &mut [u8], pin_b_level_cache: &mut [u8]) -> Option<Observation> {
    match role {
        PinRole::Switch(index) => Some(Observation::SwitchLevel { index, level }),
        PinRole::EncoderA(index) => {
            pin_a_level_cache[index as usize] = level;
            Some(Observation::EncoderPins {
                index,
                pin_a_level: level,
                pin_b_level: pin_b_level_cache[index as usize],
            })
        }
        PinRole::EncoderB(index) => {
            pin_b_level_cache[index as usize] = level;
            Some(Observation::EncoderPins {
                index,
                pin_a_level: pin_a_level_cache[index as usize],
                pin_b_level: level,
            })
        }
        PinRole::Unused => None,
    }
}
