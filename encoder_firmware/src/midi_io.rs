//! Outbound MIDI logging and the [`encoder_core::MidiSink`] adapter over a split UART.

use defmt::{debug, trace};
use embedded_midi::MidiOut;
use encoder_core::{CoreError, MidiSink};
use midi_types::MidiMessage;

pub fn log_message(message: &MidiMessage) {
    match message {
        MidiMessage::ControlChange(chan, ctrl, val) => {
            let (chan, ctrl, val): (u8, u8, u8) = ((*chan).into(), (*ctrl).into(), (*val).into());
            debug!("[midi_send] cc chan={} ctrl={} val={}", chan, ctrl, val);
        }
        MidiMessage::NoteOn(chan, note, vel) => {
            let (chan, note, vel): (u8, u8, u8) = ((*chan).into(), (*note).into(), (*vel).into());
            debug!("[midi_send] note on chan={} note={} vel={}", chan, note, vel);
        }
        MidiMessage::NoteOff(chan, note, _vel) => {
            let (chan, note): (u8, u8) = ((*chan).into(), (*note).into());
            debug!("[midi_send] note off chan={} note={}", chan, note);
        }
        MidiMessage::ProgramChange(chan, program) => {
            let (chan, program): (u8, u8) = ((*chan).into(), (*program).into());
            debug!("[midi_send] program change chan={} program={}", chan, program);
        }
        _ => trace!("[midi_send] other"),
    }
}

/// Adapts `embedded_midi`'s UART writer half to the core's transport-agnostic sink trait.
pub struct UartMidiSink<W>
where
    W: embedded_hal::serial::Write<u8>,
{
    midi_out: MidiOut<W>,
}

impl<W> UartMidiSink<W>
where
    W: embedded_hal::serial::Write<u8>,
{
    pub fn new(midi_out: MidiOut<W>) -> Self {
        UartMidiSink { midi_out }
    }
}

impl<W> MidiSink for UartMidiSink<W>
where
    W: embedded_hal::serial::Write<u8>,
{
    fn send(&mut self, message: MidiMessage) -> Result<(), CoreError> {
        log_message(&message);
        self.midi_out.write(&message).map_err(|_| CoreError::SinkEmission)
    }
}
