//! A tick-driven DCF77 time-code decoder.
//!
//! Call [`Dcf77::tick`] at exactly 100 Hz with the receiver's output level (`true` while the
//! carrier is reduced, i.e. during a second pulse). The decoder measures pulse and pause widths,
//! frames the 59 bits of each minute, checks the three parity groups and latches a validated
//! [`Dcf77Time`] once two consecutive frames agree (the second one exactly one minute after the
//! first). The latched time is handed out at second 15 of the following minute and can be taken
//! exactly once with [`Dcf77::take_time`].
//!
//! [`SharedDcf77`] wraps the decoder for use between an interrupt (or a 100 Hz task) and the main
//! loop.

use core::cell::RefCell;

use critical_section::Mutex;
use portable_atomic::{AtomicBool, Ordering};
use time::{Date, Month, PrimitiveDateTime, Time};

/// Decoder sample rate.
pub const TICKS_PER_SECOND: u8 = 100;

const POWER_ON_TICKS: u8 = 100;
const PAUSE_MIN: u8 = 75;
const PAUSE_MAX: u8 = 120;
const PAUSE_LOST: u8 = 250;
const PULSE_GLITCH_MAX: u8 = 5;
const PULSE_ZERO_MAX: u8 = 15;
const PULSE_MAX: u8 = 25;

const SEARCHING: u8 = 0xFF;
const FRAME_BITS: u8 = 59;
const PUBLISH_BIT: u8 = 15;
const FIELD_RESET_BIT: u8 = 16;
const DST_BIT: u8 = 17;
const MINUTE_PARITY_BIT: u8 = 28;
const HOUR_PARITY_BIT: u8 = 35;
const DATE_PARITY_BIT: u8 = 58;

const MINUTE_WEIGHTS: [u8; 7] = [1, 2, 4, 8, 10, 20, 40];
const HOUR_WEIGHTS: [u8; 6] = [1, 2, 4, 8, 10, 20];
const MDAY_WEIGHTS: [u8; 6] = [1, 2, 4, 8, 10, 20];
const WDAY_WEIGHTS: [u8; 3] = [1, 2, 4];
const MONTH_WEIGHTS: [u8; 5] = [1, 2, 4, 8, 10];
const YEAR_WEIGHTS: [u8; 8] = [1, 2, 4, 8, 10, 20, 40, 80];

/// Receiver state.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dcf77State {
    /// Power-on guard, one second.
    PowerOn,
    /// Lost synchronization, waiting for the line to go idle.
    Unknown,
    /// Idle line, waiting for the first pulse edge.
    Wait,
    /// Measuring a pause.
    Low,
    /// Measuring a pulse.
    High,
}

/// A decoded, double-checked DCF77 time, in `struct tm` conventions.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dcf77Time {
    /// Years since 1900.
    pub year: u16,
    /// Month, `0..=11`.
    pub month: u8,
    /// Day of month, `1..=31`.
    pub mday: u8,
    /// Day of week, Sunday = 0.
    pub wday: u8,
    pub hour: u8,
    pub minute: u8,
    /// Always 15: the time is handed out at second 15 of its minute.
    pub second: u8,
    /// Central European Summer Time.
    pub is_dst: bool,
}

impl Dcf77Time {
    /// Convert to a calendar date-time.
    ///
    /// # Errors
    ///
    /// Returns an error if the decoded fields do not form a valid date or time.
    pub fn to_primitive_date_time(&self) -> Result<PrimitiveDateTime, time::error::ComponentRange> {
        let month = Month::try_from(self.month.saturating_add(1))?;
        let date = Date::from_calendar_date(1900 + i32::from(self.year), month, self.mday)?;
        let time = Time::from_hms(self.hour, self.minute, self.second)?;
        Ok(PrimitiveDateTime::new(date, time))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameFields {
    minute: u8,
    hour: u8,
    mday: u8,
    wday: u8,
    month: u8,
    year: u8,
    is_dst: bool,
}

impl FrameFields {
    const fn is_plausible(&self) -> bool {
        self.minute < 60
            && self.hour < 24
            && self.mday >= 1
            && self.mday <= 31
            && self.wday >= 1
            && self.wday <= 7
            && self.month >= 1
            && self.month <= 12
    }

    fn to_time(self) -> Dcf77Time {
        Dcf77Time {
            year: u16::from(self.year) + 100,
            month: self.month.saturating_sub(1),
            mday: self.mday,
            wday: self.wday % 7,
            hour: self.hour,
            minute: self.minute,
            second: PUBLISH_BIT,
            is_dst: self.is_dst,
        }
    }
}

/// The DCF77 decoder state machine.
#[derive(Debug)]
pub struct Dcf77 {
    state: Dcf77State,
    counter: u8,
    bit_index: u8,
    minute_parity: bool,
    hour_parity: bool,
    date_parity: bool,
    fields: FrameFields,
    previous: Option<(u8, u8)>,
    time_complete: bool,
    time_is_valid: Option<Dcf77Time>,
}

impl Default for Dcf77 {
    fn default() -> Self {
        Self::new()
    }
}

impl Dcf77 {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Dcf77State::PowerOn,
            counter: 0,
            bit_index: SEARCHING,
            minute_parity: false,
            hour_parity: false,
            date_parity: false,
            fields: FrameFields {
                minute: 0,
                hour: 0,
                mday: 0,
                wday: 0,
                month: 0,
                year: 0,
                is_dst: false,
            },
            previous: None,
            time_complete: false,
            time_is_valid: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> Dcf77State {
        self.state
    }

    /// Current bit slot, `None` while searching for the minute marker.
    #[must_use]
    pub const fn bit_index(&self) -> Option<u8> {
        if self.bit_index == SEARCHING {
            None
        } else {
            Some(self.bit_index)
        }
    }

    /// Whether a validated time is waiting to be taken.
    #[must_use]
    pub const fn time_pending(&self) -> bool {
        self.time_is_valid.is_some()
    }

    /// Take the pending time, if any. Each validated minute is returned once.
    pub fn take_time(&mut self) -> Option<Dcf77Time> {
        self.time_is_valid.take()
    }

    /// Feed one 10 ms sample of the receiver output.
    pub fn tick(&mut self, level_high: bool) {
        match self.state {
            Dcf77State::PowerOn => {
                self.counter = self.counter.saturating_add(1);
                if self.counter >= POWER_ON_TICKS {
                    self.resync("power-on guard elapsed");
                }
            }
            Dcf77State::Unknown => {
                if !level_high {
                    self.state = Dcf77State::Wait;
                }
            }
            Dcf77State::Wait => {
                if level_high {
                    self.state = Dcf77State::High;
                    self.counter = 1;
                }
            }
            Dcf77State::High => {
                if level_high {
                    self.counter = self.counter.saturating_add(1);
                    if self.counter >= PULSE_MAX {
                        self.resync("pulse too long");
                    }
                } else {
                    self.pulse_ended(self.counter);
                }
            }
            Dcf77State::Low => {
                if level_high {
                    self.pause_ended(self.counter);
                } else {
                    self.counter = self.counter.saturating_add(1);
                    if self.counter >= PAUSE_LOST {
                        self.resync("signal lost");
                    }
                }
            }
        }
    }

    fn resync(&mut self, reason: &str) {
        #[cfg(feature = "defmt")]
        defmt::info!("DCF77 resync: {}", reason);
        #[cfg(not(feature = "defmt"))]
        let _ = reason;
        self.state = Dcf77State::Unknown;
        self.counter = 0;
        self.bit_index = SEARCHING;
        self.time_complete = false;
    }

    fn pulse_ended(&mut self, width: u8) {
        if width <= PULSE_GLITCH_MAX {
            self.resync("pulse too short");
            return;
        }
        self.state = Dcf77State::Low;
        self.counter = 1;
        if self.bit_index != SEARCHING {
            self.process_bit(width > PULSE_ZERO_MAX);
        }
    }

    fn pause_ended(&mut self, width: u8) {
        if width < PAUSE_MIN {
            self.resync("pause too short");
            return;
        }
        if width <= PAUSE_MAX {
            if self.bit_index == FRAME_BITS {
                self.resync("minute marker missing");
                return;
            }
        } else {
            self.minute_marker();
        }
        self.state = Dcf77State::High;
        self.counter = 1;
    }

    fn minute_marker(&mut self) {
        if self.bit_index == FRAME_BITS {
            self.frame_complete();
        } else if self.bit_index != SEARCHING {
            #[cfg(feature = "defmt")]
            defmt::warn!("DCF77 frame too short: {} bits", self.bit_index);
            self.time_complete = false;
        }
        self.bit_index = 0;
    }

    fn frame_complete(&mut self) {
        let fields = self.fields;
        if !fields.is_plausible() {
            #[cfg(feature = "defmt")]
            defmt::warn!("DCF77 frame out of range");
            self.previous = None;
            return;
        }
        let current = (fields.hour, fields.minute);
        if self.previous.is_some_and(|previous| next_minute(previous) == current) {
            self.time_complete = true;
        }
        self.previous = Some(current);
    }

    fn process_bit(&mut self, bit: bool) {
        let index = self.bit_index;
        match index {
            PUBLISH_BIT => {
                if self.time_complete {
                    let time = self.fields.to_time();
                    #[cfg(feature = "defmt")]
                    defmt::info!("DCF77 time: {}:{}", time.hour, time.minute);
                    self.time_is_valid = Some(time);
                    self.time_complete = false;
                }
            }
            FIELD_RESET_BIT => {
                self.fields = FrameFields::default();
                self.minute_parity = false;
                self.hour_parity = false;
                self.date_parity = false;
            }
            DST_BIT => self.fields.is_dst = bit,
            21..=27 => {
                if bit {
                    self.fields.minute += weight(&MINUTE_WEIGHTS, index - 21);
                    self.minute_parity = !self.minute_parity;
                }
            }
            MINUTE_PARITY_BIT => {
                if bit != self.minute_parity {
                    self.parity_failed("minute");
                    return;
                }
            }
            29..=34 => {
                if bit {
                    self.fields.hour += weight(&HOUR_WEIGHTS, index - 29);
                    self.hour_parity = !self.hour_parity;
                }
            }
            HOUR_PARITY_BIT => {
                if bit != self.hour_parity {
                    self.parity_failed("hour");
                    return;
                }
            }
            36..=57 => {
                if bit {
                    self.date_bit(index);
                    self.date_parity = !self.date_parity;
                }
            }
            DATE_PARITY_BIT => {
                if bit != self.date_parity {
                    self.parity_failed("date");
                    return;
                }
            }
            _ => {}
        }

        self.bit_index += 1;
        if self.bit_index > FRAME_BITS {
            self.resync("frame too long");
        }
    }

    fn date_bit(&mut self, index: u8) {
        match index {
            36..=41 => self.fields.mday += weight(&MDAY_WEIGHTS, index - 36),
            42..=44 => self.fields.wday += weight(&WDAY_WEIGHTS, index - 42),
            45..=49 => self.fields.month += weight(&MONTH_WEIGHTS, index - 45),
            _ => self.fields.year = self.fields.year.wrapping_add(weight(&YEAR_WEIGHTS, index - 50)),
        }
    }

    fn parity_failed(&mut self, group: &str) {
        #[cfg(feature = "defmt")]
        defmt::warn!("DCF77 {} parity error", group);
        #[cfg(not(feature = "defmt"))]
        let _ = group;
        self.resync("parity error");
    }
}

fn weight(weights: &[u8], position: u8) -> u8 {
    weights.get(usize::from(position)).copied().unwrap_or(0)
}

const fn next_minute((hour, minute): (u8, u8)) -> (u8, u8) {
    if minute >= 59 {
        ((hour + 1) % 24, 0)
    } else {
        (hour, minute + 1)
    }
}

/// A [`Dcf77`] decoder shared between the 100 Hz sampling context and the main loop.
///
/// ```
/// use wordclock_kit::dcf77::SharedDcf77;
///
/// static DCF77: SharedDcf77 = SharedDcf77::new();
///
/// // 100 Hz interrupt or task:
/// DCF77.tick(false);
///
/// // Main loop:
/// if let Some(time) = DCF77.take_time() {
///     let _ = time.to_primitive_date_time();
/// }
/// ```
pub struct SharedDcf77 {
    decoder: Mutex<RefCell<Dcf77>>,
    pending: AtomicBool,
}

impl Default for SharedDcf77 {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedDcf77 {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            decoder: Mutex::new(RefCell::new(Dcf77::new())),
            pending: AtomicBool::new(false),
        }
    }

    /// Feed one 10 ms sample.
    pub fn tick(&self, level_high: bool) {
        critical_section::with(|cs| {
            let mut decoder = self.decoder.borrow_ref_mut(cs);
            decoder.tick(level_high);
            if decoder.time_pending() {
                self.pending.store(true, Ordering::Release);
            }
        });
    }

    /// Take the pending time, if any.
    pub fn take_time(&self) -> Option<Dcf77Time> {
        if !self.pending.swap(false, Ordering::AcqRel) {
            return None;
        }
        critical_section::with(|cs| self.decoder.borrow_ref_mut(cs).take_time())
    }

    /// Current receiver state.
    pub fn state(&self) -> Dcf77State {
        critical_section::with(|cs| self.decoder.borrow_ref(cs).state())
    }
}
