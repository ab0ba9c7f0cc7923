//! Per-switch edge detection, debounce, and press-duration measurement (spec §4.C).

use crate::time::{MicrosTimestamp, DEBOUNCE_US};

/// Which pin level corresponds to "pressed". Native GPIO wired with a pull-up (press pulls the
/// pin low) and the I2C port-expander (same pull-up wiring) are `ActiveLow`. The UART transport
/// was found to invert this in testing (spec §9's open question); it is configured
/// `ActiveHigh` by default, but polarity is always explicit per-switch rather than inferred from
/// the transport, so a misbehaving board can be corrected without a code change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveLow,
    ActiveHigh,
}

impl Polarity {
    fn is_press(self, level: u8) -> bool {
        match self {
            Polarity::ActiveLow => level == 0,
            Polarity::ActiveHigh => level == 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEventKind {
    None,
    CtrlChange,
    NoteOn,
    ProgChange,
    CvGateIn,
}

/// A switch's MIDI binding, set independently of its hardware pin via
/// [`Switch::setup_midi`] (spec §6 `setup_switch_midi`).
#[derive(Debug, Clone, Copy)]
pub struct MidiEventBinding {
    pub kind: MidiEventKind,
    pub chan: u8,
    pub num: u8,
    pub val: u8,
}

impl Default for MidiEventBinding {
    fn default() -> Self {
        MidiEventBinding {
            kind: MidiEventKind::None,
            chan: 0,
            num: 0,
            val: 0,
        }
    }
}

/// A single pushbutton switch's debounced state.
#[derive(Debug, Clone)]
pub struct Switch {
    pub enabled: bool,
    pin: u8,
    polarity: Polarity,
    status: u8,
    tsus: MicrosTimestamp,
    dtus: u64,
    midi_event: MidiEventBinding,
    last_cvgate_note: u8,
}

impl Default for Switch {
    fn default() -> Self {
        Switch {
            enabled: false,
            pin: 0,
            polarity: Polarity::ActiveLow,
            status: 1,
            tsus: 0,
            dtus: 0,
            midi_event: MidiEventBinding::default(),
            last_cvgate_note: 0,
        }
    }
}

impl Switch {
    pub fn new() -> Switch {
        Switch::default()
    }

    /// Bind to a hardware pin. `pin == 0` disables the hardware binding (spec §6: "used for
    /// virtual switches") while leaving the switch enabled for MIDI-binding purposes, mirroring
    /// `setup_switch`'s "pin 0 disables hardware binding" rule.
    pub fn setup(&mut self, pin: u8, polarity: Polarity) {
        self.enabled = pin != 0;
        self.pin = pin;
        self.polarity = polarity;
        self.tsus = 0;
        self.dtus = 0;
    }

    pub fn setup_midi(&mut self, event: MidiEventBinding) {
        self.midi_event = event;
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn midi_event(&self) -> MidiEventBinding {
        self.midi_event
    }

    pub fn last_cvgate_note(&self) -> u8 {
        self.last_cvgate_note
    }

    pub fn set_last_cvgate_note(&mut self, note: u8) {
        self.last_cvgate_note = note;
    }

    pub fn is_press_level(&self, level: u8) -> bool {
        self.polarity.is_press(level)
    }

    /// Observe a fresh level from the transport. Returns the new `status` iff it differs from
    /// the stored level (spec §4.C step 1: idempotence). The caller (the router) is responsible
    /// for invoking `send_switch_midi` on every `Some` result — emission happens on the raw
    /// edge, this method only tracks duration bookkeeping.
    pub fn observe_level(&mut self, level: u8, now_us: MicrosTimestamp) -> Option<u8> {
        if !self.enabled || level == self.status {
            return None;
        }
        self.status = level;

        if self.polarity.is_press(level) {
            self.tsus = now_us;
        } else if self.tsus > 0 {
            let dtus = now_us.wrapping_sub(self.tsus);
            if dtus < DEBOUNCE_US {
                // spurious release; drop it, as the source does
                self.tsus = 0;
            } else {
                self.dtus = dtus;
                self.tsus = 0;
            }
        }

        Some(self.status)
    }

    /// `get_switch_dtus` (spec §4.C query): return and clear a completed press duration if one
    /// is pending, else detect and report a long-hold still in progress, else 0.
    pub fn query_dtus(&mut self, now_us: MicrosTimestamp, long_dtus_us: u64) -> u64 {
        if self.dtus > 0 {
            let dtus = self.dtus;
            self.dtus = 0;
            return dtus;
        }
        if self.tsus > 0 {
            let elapsed = now_us.wrapping_sub(self.tsus);
            if elapsed > long_dtus_us {
                self.tsus = 0;
                return elapsed;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spurious_release_is_dropped() {
        let mut sw = Switch::new();
        sw.setup(5, Polarity::ActiveLow);
        assert_eq!(sw.observe_level(0, 0), Some(0)); // press
        assert_eq!(sw.observe_level(1, 500), Some(1)); // release 500us later: spurious
        assert_eq!(sw.query_dtus(500, 1_000_000), 0);
    }

    #[test]
    fn normal_press_release_reports_duration() {
        let mut sw = Switch::new();
        sw.setup(5, Polarity::ActiveLow);
        sw.observe_level(0, 0);
        sw.observe_level(1, 50_000);
        assert_eq!(sw.query_dtus(50_000, 1_000_000), 50_000);
        // consumed; further queries return 0 until next edge
        assert_eq!(sw.query_dtus(60_000, 1_000_000), 0);
    }

    #[test]
    fn long_press_detected_before_release() {
        let mut sw = Switch::new();
        sw.setup(5, Polarity::ActiveLow);
        sw.observe_level(0, 0);
        assert_eq!(sw.query_dtus(2_000_000, 1_000_000), 2_000_000);
        assert_eq!(sw.query_dtus(2_500_000, 1_000_000), 0);
    }

    #[test]
    fn idempotent_identical_level_is_dropped() {
        let mut sw = Switch::new();
        sw.setup(5, Polarity::ActiveLow);
        sw.status = 1;
        assert_eq!(sw.observe_level(1, 10), None);
    }

    #[test]
    fn zero_pin_disables_hardware_binding() {
        let mut sw = Switch::new();
        sw.setup(0, Polarity::ActiveLow);
        assert!(!sw.enabled);
        assert_eq!(sw.observe_level(0, 10), None);
    }

    #[test]
    fn active_high_polarity_inverts_press_edge() {
        let mut sw = Switch::new();
        sw.setup(5, Polarity::ActiveHigh);
        sw.observe_level(1, 0); // press
        sw.observe_level(0, 20_000); // release
        assert_eq!(sw.query_dtus(20_000, 1_000_000), 20_000);
    }
}
