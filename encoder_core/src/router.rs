//! Event routing: turns encoder/switch state changes into outbound MIDI/OSC messages, and
//! rehydrates encoder state from inbound MIDI without ever re-triggering an outbound send
//! (spec §4.D — the critical anti-feedback-loop invariant).

use midi_types::{Channel, MidiMessage, Note, Program, Value7};

use crate::cvgate::CvGateConfig;
use crate::error::CoreError;
use crate::registry::{EncoderRegistry, SwitchRegistry};
use crate::switch::MidiEventKind;

/// Outbound MIDI transport, implemented once per firmware build (UART MIDI DIN, USB-MIDI,
/// or both) the way the teacher's `microgroove_app` wraps its UART in a small send function.
pub trait MidiSink {
    fn send(&mut self, message: MidiMessage) -> Result<(), CoreError>;
}

/// Outbound OSC transport. Binary (toggle) encoders send a boolean; every other bound value
/// sends an integer (spec §4.D: "binary encoders send T/F, others send an integer").
pub trait OscSink {
    fn send_bool(&mut self, path: &str, port: u16, value: bool) -> Result<(), CoreError>;
    fn send_int(&mut self, path: &str, port: u16, value: i32) -> Result<(), CoreError>;
}

fn clamp_value7(value: u32) -> Value7 {
    (value.min(127) as u8).into()
}

/// Owns both registries and the CV/gate calibration; the single place wiring transport
/// observations to outbound sends and inbound MIDI to rehydration.
#[derive(Debug, Clone, Default)]
pub struct EventRouter {
    pub encoders: EncoderRegistry,
    pub switches: SwitchRegistry,
    pub cvgate: CvGateConfig,
}

impl EventRouter {
    pub fn new() -> Self {
        EventRouter {
            encoders: EncoderRegistry::new(),
            switches: SwitchRegistry::new(),
            cvgate: CvGateConfig::default(),
        }
    }

    /// Dispatch a freshly-changed encoder value. Called only when the encoder's own
    /// `observe_*` method returned `Some` — i.e. never from the rehydration path.
    ///
    /// Precedence (spec §3, §4.D): MIDI wins if `midi_ctrl > 0`; else OSC if bound; else no-op.
    /// Exactly one of MIDI or OSC routing is active for a given update, never both.
    pub fn dispatch_encoder_change(
        &mut self,
        index: usize,
        value: u32,
        midi: &mut impl MidiSink,
        osc: &mut impl OscSink,
    ) -> Result<(), CoreError> {
        let e = self.encoders.get(index).ok_or(CoreError::OutOfBounds)?;

        if e.midi_ctrl() > 0 {
            let message = MidiMessage::ControlChange(
                e.midi_chan().into(),
                e.midi_ctrl().into(),
                clamp_value7(value),
            );
            return midi.send(message);
        }

        if let Some(binding) = e.osc() {
            return if e.is_binary() {
                osc.send_bool(&binding.path, binding.port, value >= 64)
            } else {
                osc.send_int(&binding.path, binding.port, value as i32)
            };
        }

        Ok(())
    }

    /// Dispatch a freshly-changed switch level (spec §4.C step 2: emission happens on the raw
    /// edge, immediately, regardless of debounce bookkeeping outcome). `cv_raw_sample` is only
    /// consulted for switches bound to `CvGateIn`.
    pub fn dispatch_switch_change(
        &mut self,
        index: usize,
        level: u8,
        cv_raw_sample: u16,
        midi: &mut impl MidiSink,
    ) -> Result<(), CoreError> {
        let is_press = {
            let s = self.switches.get(index).ok_or(CoreError::OutOfBounds)?;
            s.is_press_level(level)
        };
        let binding = self
            .switches
            .get(index)
            .ok_or(CoreError::OutOfBounds)?
            .midi_event();

        let chan: Channel = binding.chan.into();
        match binding.kind {
            MidiEventKind::None => Ok(()),
            MidiEventKind::CtrlChange => {
                let val_u8 = if is_press { binding.val } else { 0 };
                let message = MidiMessage::ControlChange(chan, binding.num.into(), val_u8.into());
                // spec §4.D: CTRL_CHANGE additionally rehydrates any encoder bound to the same
                // (chan, num), same as an inbound CC would — this does not itself emit.
                self.handle_midi_in(&message);
                midi.send(message)
            }
            MidiEventKind::NoteOn => {
                let note: Note = binding.num.into();
                if is_press {
                    midi.send(MidiMessage::NoteOn(chan, note, binding.val.into()))
                } else {
                    midi.send(MidiMessage::NoteOff(chan, note, 0.into()))
                }
            }
            MidiEventKind::ProgChange => {
                if is_press {
                    let program: Program = binding.num.into();
                    midi.send(MidiMessage::ProgramChange(chan, program))
                } else {
                    Ok(())
                }
            }
            MidiEventKind::CvGateIn => {
                if is_press {
                    let note = self.cvgate.note_for_raw_sample(cv_raw_sample);
                    if let Some(s) = self.switches.get_mut(index) {
                        s.set_last_cvgate_note(note);
                    }
                    midi.send(MidiMessage::NoteOn(chan, note.into(), binding.val.into()))
                } else {
                    let note = self
                        .switches
                        .get(index)
                        .ok_or(CoreError::OutOfBounds)?
                        .last_cvgate_note();
                    midi.send(MidiMessage::NoteOff(chan, note.into(), 0.into()))
                }
            }
        }
    }

    /// Rehydrate every encoder bound to an inbound control-change's channel/controller. Scales
    /// the 0-127 MIDI value into the encoder's own range. Deliberately has no access to a
    /// `MidiSink`/`OscSink` — there is no code path from here back out to an outbound send, so
    /// an inbound CC can never cause the encoder it just updated to echo straight back out.
    pub fn handle_midi_in(&mut self, message: &MidiMessage) {
        if let MidiMessage::ControlChange(chan, ctrl, val) = message {
            let chan_u8: u8 = (*chan).into();
            let ctrl_u8: u8 = (*ctrl).into();
            let val_u8: u8 = (*val).into();
            for e in self.encoders.bound_to_cc(chan_u8, ctrl_u8) {
                let scaled = (val_u8 as u32 * e.max_value()) / 127;
                e.rehydrate(scaled);
            }
        }
    }
}
