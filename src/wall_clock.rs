//! Free-running time of day between DCF77 updates.
//!
//! The receiver delivers at most one time per minute and none at all while reception is poor,
//! so the display loop counts its own 64 Hz ticks and only resynchronizes when a decoded time
//! arrives.

use crate::display::DISPLAY_TICK_HZ;

/// What a display tick changed on the [`WallClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStep {
    /// Not synchronized yet, or still inside the same second.
    Idle,
    /// A new second of the same minute.
    Second(u8),
    /// A new minute started; the second is 0.
    Minute { hour: u8, minute: u8 },
}

/// Hours, minutes and seconds advanced by display ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallClock {
    hour: u8,
    minute: u8,
    second: u8,
    sub_ticks: u32,
    synced: bool,
}

impl WallClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hour: 0,
            minute: 0,
            second: 0,
            sub_ticks: 0,
            synced: false,
        }
    }

    /// Adopt a decoded time; counting restarts at the start of `second`.
    pub const fn sync(&mut self, hour: u8, minute: u8, second: u8) {
        self.hour = hour % 24;
        self.minute = minute % 60;
        self.second = second % 60;
        self.sub_ticks = 0;
        self.synced = true;
    }

    #[must_use]
    pub const fn is_synced(&self) -> bool {
        self.synced
    }

    /// `(hour, minute, second)` once synchronized.
    #[must_use]
    pub const fn time(&self) -> Option<(u8, u8, u8)> {
        if self.synced {
            Some((self.hour, self.minute, self.second))
        } else {
            None
        }
    }

    /// Advance by one display tick.
    pub const fn tick(&mut self) -> ClockStep {
        if !self.synced {
            return ClockStep::Idle;
        }
        self.sub_ticks += 1;
        if self.sub_ticks < DISPLAY_TICK_HZ {
            return ClockStep::Idle;
        }
        self.sub_ticks = 0;
        self.second += 1;
        if self.second < 60 {
            return ClockStep::Second(self.second);
        }
        self.second = 0;
        self.minute += 1;
        if self.minute == 60 {
            self.minute = 0;
            self.hour = (self.hour + 1) % 24;
        }
        ClockStep::Minute {
            hour: self.hour,
            minute: self.minute,
        }
    }
}
