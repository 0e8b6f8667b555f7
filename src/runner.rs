//! Async loops that drive the decoder and the display engine on embassy.
//!
//! Both are plain `async fn`s so the application can wrap them in its own
//! `#[embassy_executor::task]` with concrete pin and collaborator types.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embedded_hal::digital::InputPin;

use crate::dcf77::{Dcf77Time, SharedDcf77, TICKS_PER_SECOND};
use crate::display::{ClockFlags, DISPLAY_TICK_HZ, Display};
use crate::hardware::{LedSink, PowerRail, SyncNotifier};
use crate::persist::ConfigStore;
use crate::wall_clock::{ClockStep, WallClock};
use crate::word_tables::WordTables;

/// Decoded times, one per minute once the receiver is in sync.
pub type TimeSignal = Signal<CriticalSectionRawMutex, Dcf77Time>;

/// Sample `pin` at 100 Hz forever and signal every validated time.
///
/// A pin read error counts as a low level.
pub async fn run_dcf77(mut pin: impl InputPin, decoder: &SharedDcf77, times: &TimeSignal) -> ! {
    let mut ticker = Ticker::every(Duration::from_hz(u64::from(TICKS_PER_SECOND)));
    #[cfg(feature = "defmt")]
    defmt::info!("DCF77 sampling started");
    loop {
        ticker.next().await;
        decoder.tick(pin.is_high().unwrap_or(false));
        if let Some(time) = decoder.take_time() {
            #[cfg(feature = "defmt")]
            defmt::info!("DCF77 time {}:{}", time.hour, time.minute);
            times.signal(time);
        }
    }
}

/// Tick `display` at 64 Hz forever.
///
/// Time runs locally between decoded minutes; every time from `times` resynchronizes it.
pub async fn run_display<T, L, P, S, C>(
    display: &mut Display<T, L, P, S, C>,
    times: &TimeSignal,
) -> !
where
    T: WordTables,
    L: LedSink,
    P: PowerRail,
    S: SyncNotifier,
    C: ConfigStore,
{
    let mut ticker = Ticker::every(Duration::from_hz(u64::from(DISPLAY_TICK_HZ)));
    let mut clock = WallClock::new();
    loop {
        ticker.next().await;
        if let Some(time) = times.try_take() {
            clock.sync(time.hour, time.minute, time.second);
            display.clock(time.hour, time.minute, ClockFlags::default());
            display.set_second(time.second);
        } else {
            match clock.tick() {
                ClockStep::Idle => {}
                ClockStep::Second(second) => display.set_second(second),
                ClockStep::Minute { hour, minute } => {
                    display.clock(hour, minute, ClockFlags::default());
                    display.set_second(0);
                }
            }
        }
        display.tick();
    }
}
