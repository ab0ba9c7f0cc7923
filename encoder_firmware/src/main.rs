#![no_std]
#![no_main]

mod midi_io;
mod osc_io;
mod peripherals;
mod transport_expander;
mod transport_gpio;
mod transport_uart;

use panic_probe as _;

/// RTIC app: wires whichever transport this build selected (see this crate's `transport-*`
/// Cargo features) to `encoder_core::EventRouter`, and pumps MIDI in/out over the shared UART.
#[rtic::app(
    device = rp_pico::hal::pac,
    peripherals = true,
    dispatchers = [USBCTRL_IRQ, DMA_IRQ_0, DMA_IRQ_1]
)]
mod app {
    use defmt::{error, info, trace};
    use defmt_rtt as _;
    use encoder_core::{
        CoreError, CvGateConfig, EncoderConfig, EventRouter, MidiEventBinding, MidiEventKind,
        MidiSink, Polarity,
    };
    use fugit::MicrosDurationU64;
    use midi_types::MidiMessage;
    use nb::block;
    use rp_pico::hal::timer::monotonic::Monotonic;

    use crate::{
        midi_io::{log_message, UartMidiSink},
        osc_io::LoggingOscSink,
        peripherals::{setup, MidiIn},
        transport_gpio::{EncoderPins, SwitchPin},
    };

    #[monotonic(binds = TIMER_IRQ_0, default = true)]
    type TimerMonotonic = Monotonic<rp_pico::hal::timer::Alarm0>;

    /// How often to poll the encoder/switch pins. Matches the teacher's 1ms encoder poll
    /// interval, which the spec's debounce window (1ms) assumes as the noise floor.
    const INPUT_POLL_INTERVAL: MicrosDurationU64 = MicrosDurationU64::millis(1);

    #[shared]
    struct Shared {
        router: EventRouter,
    }

    #[local]
    struct Local {
        midi_in: MidiIn,
        midi_out: UartMidiSink<crate::peripherals::MidiOutWriter>,
        encoder_pins: EncoderPins<crate::peripherals::EncoderAPin, crate::peripherals::EncoderBPin>,
        switch_pins: SwitchPin<crate::peripherals::SwitchPin0>,
    }

    /// Hands an outbound message to the `midi_send` task rather than writing the UART directly,
    /// so `dispatch_encoder_change`/`dispatch_switch_change` can be called from any task while
    /// `midi_out` itself stays exclusively owned by `midi_send` (RTIC local resources cannot be
    /// claimed by more than one task).
    struct SpawningMidiSink;

    impl MidiSink for SpawningMidiSink {
        fn send(&mut self, message: MidiMessage) -> Result<(), CoreError> {
            midi_send::spawn(message).map_err(|_| CoreError::SinkEmission)
        }
    }

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        info!("[init] hello world!");

        defmt::timestamp!("{=u64:us}", {
            monotonics::now().duration_since_epoch().to_micros()
        });

        let (midi_in, midi_out, encoder_pins, switch_pins, monotonic_timer) = setup(ctx.device);

        let mut router = EventRouter::new();
        router
            .encoders
            .setup(
                0,
                EncoderConfig {
                    pin_a: 9,
                    pin_b: 10,
                    midi_chan: 0,
                    midi_ctrl: 1,
                    osc: None,
                    value: 0,
                    max_value: 127,
                    step: 0,
                },
            )
            .expect("encoder 0 setup should succeed");
        router
            .switches
            .setup(0, 0, Polarity::ActiveLow)
            .expect("switch 0 setup should succeed");
        router
            .switches
            .setup_midi(
                0,
                MidiEventBinding {
                    kind: MidiEventKind::NoteOn,
                    chan: 0,
                    num: 60,
                    val: 100,
                },
            )
            .expect("switch 0 midi setup should succeed");
        router.cvgate = CvGateConfig::default();

        read_inputs::spawn().expect("read_inputs::spawn should succeed");

        info!("[init] complete");

        (
            Shared { router },
            Local {
                midi_in,
                midi_out: UartMidiSink::new(midi_out),
                encoder_pins,
                switch_pins,
            },
            init::Monotonics(monotonic_timer),
        )
    }

    /// Handle inbound MIDI. Rehydrates any encoder bound to a received CC and passes everything
    /// else through untouched (soft thru) — `handle_midi_in` never emits, so this can never
    /// cause the encoder it just updated to echo straight back out.
    #[task(
        binds = UART0_IRQ,
        priority = 4,
        shared = [router],
        local = [midi_in]
    )]
    fn uart0_irq(mut ctx: uart0_irq::Context) {
        trace!("[uart0_irq] start");

        if let Ok(message) = block!(ctx.local.midi_in.read()) {
            ctx.shared.router.lock(|router| router.handle_midi_in(&message));
            if midi_send::spawn(message).is_err() {
                error!("could not spawn midi_send to pass through message");
            }
        }
    }

    /// The only task allowed to touch `midi_out`; every other task reaches it by spawning here.
    #[task(priority = 3, capacity = 64, local = [midi_out])]
    fn midi_send(ctx: midi_send::Context, message: MidiMessage) {
        log_message(&message);
        if ctx.local.midi_out.send(message).is_err() {
            error!("midi_out send failed");
        }
    }

    /// Poll encoder and switch pins, feed any resulting observation into the router, and
    /// dispatch outbound MIDI/OSC for whatever value actually changed.
    #[task(
        priority = 4,
        shared = [router],
        local = [encoder_pins, switch_pins],
    )]
    fn read_inputs(mut ctx: read_inputs::Context) {
        use encoder_core::transport::Observation;

        let now_us = monotonics::now().duration_since_epoch().to_micros();

        let encoder_obs = ctx.local.encoder_pins.observe();
        let switch_obs = ctx.local.switch_pins.observe();

        let mut midi = SpawningMidiSink;
        let mut osc = LoggingOscSink::default();

        ctx.shared.router.lock(|router| {
            if let Observation::EncoderPins { index, pin_a_level, pin_b_level } = encoder_obs {
                let changed = router
                    .encoders
                    .get_mut(index as usize)
                    .and_then(|e| e.observe_pins(pin_a_level, pin_b_level, now_us));
                if let Some(value) = changed {
                    if router
                        .dispatch_encoder_change(index as usize, value, &mut midi, &mut osc)
                        .is_err()
                    {
                        error!("dispatch_encoder_change failed");
                    }
                }
            }
            if let Observation::SwitchLevel { index, level } = switch_obs {
                let changed = router
                    .switches
                    .get_mut(index as usize)
                    .and_then(|s| s.observe_level(level, now_us));
                if changed.is_some() {
                    if router
                        .dispatch_switch_change(index as usize, level, 0, &mut midi)
                        .is_err()
                    {
                        error!("dispatch_switch_change failed");
                    }
                }
            }
        });

        read_inputs::spawn_after(INPUT_POLL_INTERVAL).unwrap();
    }

    #[idle]
    fn task_main(_: task_main::Context) -> ! {
        loop {
            cortex_m::asm::nop();
        }
    }
}
