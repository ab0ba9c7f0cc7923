//! Device initialisation and interfacing.
//!
//! Built for the native-GPIO transport by default (see this crate's `transport-*` features).
//! Only the encoder/switch pin wiring differs between transports; the MIDI UART and monotonic
//! timer setup is shared by all three, so it lives here unconditionally.

use embedded_midi;
use fugit::{HertzU32, RateExtU32};
use rp_pico::{
    hal::{
        clocks::{self, Clock},
        gpio::{pin::bank0::*, FunctionUart, Interrupt::EdgeLow, Pin, PullUpInput},
        pac::{self, RESETS, TIMER, UART0},
        sio::Sio,
        timer::{monotonic::Monotonic, Alarm0},
        uart::{DataBits, Reader, StopBits, UartConfig, UartPeripheral, Writer},
        Timer, Watchdog,
    },
    Pins, XOSC_CRYSTAL_FREQ,
};

type MidiOutUartPin = Pin<Gpio16, FunctionUart>;
type MidiInUartPin = Pin<Gpio17, FunctionUart>;
type MidiUartPins = (MidiOutUartPin, MidiInUartPin);

pub type MidiOutWriter = Writer<UART0, MidiUartPins>;
pub type MidiIn = embedded_midi::MidiIn<Reader<UART0, MidiUartPins>>;
pub type MidiOut = embedded_midi::MidiOut<MidiOutWriter>;

#[cfg(feature = "transport-native")]
pub type EncoderAPin = Pin<Gpio9, rp_pico::hal::gpio::FloatingInput>;
#[cfg(feature = "transport-native")]
pub type EncoderBPin = Pin<Gpio10, rp_pico::hal::gpio::FloatingInput>;
#[cfg(feature = "transport-native")]
pub type SwitchPin0 = Pin<Gpio0, PullUpInput>;

#[cfg(feature = "transport-native")]
pub fn setup(
    mut pac: pac::Peripherals,
) -> (
    MidiIn,
    MidiOut,
    crate::transport_gpio::EncoderPins<EncoderAPin, EncoderBPin>,
    crate::transport_gpio::SwitchPin<SwitchPin0>,
    Monotonic<Alarm0>,
) {
    let sio = Sio::new(pac.SIO);
    let pins = Pins::new(pac.IO_BANK0, pac.PADS_BANK0, sio.gpio_bank0, &mut pac.RESETS);

    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = clocks::init_clocks_and_plls(
        XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .expect("init: init_clocks_and_plls(...) should succeed");

    let (midi_in, midi_out) = new_midi_uart(
        pac.UART0,
        pins.gpio16.into_mode::<FunctionUart>(),
        pins.gpio17.into_mode::<FunctionUart>(),
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
    );

    let pin_a = pins.gpio9.into_floating_input();
    let pin_b = pins.gpio10.into_floating_input();
    pin_a.set_interrupt_enabled(EdgeLow, true);
    pin_b.set_interrupt_enabled(EdgeLow, true);
    let encoder_pins = crate::transport_gpio::EncoderPins {
        index: 0,
        pin_a,
        pin_b,
    };

    let switch_pin = pins.gpio0.into_pull_up_input();
    switch_pin.set_interrupt_enabled(EdgeLow, true);
    let switch_pins = crate::transport_gpio::SwitchPin {
        index: 0,
        pin: switch_pin,
    };

    (
        midi_in,
        midi_out,
        encoder_pins,
        switch_pins,
        new_monotonic_timer(pac.TIMER, &mut pac.RESETS),
    )
}

fn new_monotonic_timer(timer: TIMER, resets: &mut RESETS) -> Monotonic<Alarm0> {
    let mut timer = Timer::new(timer, resets);
    let monotonic_alarm = timer.alarm_0().unwrap();
    Monotonic::new(timer, monotonic_alarm)
}

fn new_midi_uart(
    uart: UART0,
    out_pin: MidiOutUartPin,
    in_pin: MidiInUartPin,
    resets: &mut RESETS,
    peripheral_clock_freq: HertzU32,
) -> (MidiIn, MidiOut) {
    let midi_uart_pins = (out_pin, in_pin);
    let uart_config = UartConfig::new(31_250.Hz(), DataBits::Eight, None, StopBits::One);
    let mut midi_uart = UartPeripheral::new(uart, midi_uart_pins, resets)
        .enable(uart_config, peripheral_clock_freq)
        .expect("enabling uart for midi should succeed");
    midi_uart.enable_rx_interrupt();
    let (midi_reader, midi_writer) = midi_uart.split();
    (
        embedded_midi::MidiIn::new(midi_reader),
        embedded_midi::MidiOut::new(midi_writer),
    )
}
