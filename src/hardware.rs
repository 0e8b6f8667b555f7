//! Collaborators the display engine drives: the LED strip, its power rail and an optional remote
//! peer that mirrors setting changes.

use smart_leds::RGB8;

use crate::color::{DimCurve, LedColor};
use crate::config::{AmbilightMode, AnimationMode, AnimationSetting, ColorAnimationMode, DisplayFlags};

/// Frame-buffer sink for the whole strip (status, minute, display and ambilight zones).
pub trait LedSink {
    /// Set LED `index` to gamma-corrected `rgb` plus an optional white channel.
    fn set_led(&mut self, index: usize, rgb: RGB8, white: u8);

    /// Push the first `count` LEDs to the hardware.
    fn refresh(&mut self, count: usize);
}

/// Switches the LED supply.
///
/// After [`PowerRail::power_on`] the engine waits a settle window before writing to the sink.
pub trait PowerRail {
    fn power_on(&mut self);
    fn power_off(&mut self);
}

/// A setting that changed locally and should be mirrored to a paired device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    DisplayMode(u8),
    AnimationMode(AnimationMode),
    AnimationSetting(AnimationMode, AnimationSetting),
    ColorAnimationMode(ColorAnimationMode),
    ColorAnimationDeceleration(u8),
    AmbilightMode(AmbilightMode),
    DisplayColor(LedColor),
    AmbilightColor(LedColor),
    MarkerColor(LedColor),
    DisplayBrightness(u8),
    AmbilightBrightness(u8),
    DisplayDimCurve(DimCurve),
    AmbilightDimCurve(DimCurve),
    DisplayPower(bool),
    AmbilightPower(bool),
    Flags(DisplayFlags),
    TickerDeceleration(u8),
    AmbilightOffset(u8),
}

/// Fire-and-forget notification of local setting changes.
pub trait SyncNotifier {
    fn notify(&mut self, event: SyncEvent);
}

/// A [`SyncNotifier`] for clocks without a paired device.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSync;

impl SyncNotifier for NoSync {
    fn notify(&mut self, _event: SyncEvent) {}
}

/// A [`PowerRail`] for strips that are always powered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOn;

impl PowerRail for AlwaysOn {
    fn power_on(&mut self) {}
    fn power_off(&mut self) {}
}

/// An in-memory [`LedSink`] holding one frame of `N` pixels.
///
/// Pass `pixels()` to a `smart_leds::SmartLedsWrite` driver after each refresh.
#[derive(Debug, Clone)]
pub struct StripBuffer<const N: usize> {
    pixels: [RGB8; N],
    white: [u8; N],
    refreshes: usize,
}

impl<const N: usize> Default for StripBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> StripBuffer<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pixels: [RGB8 { r: 0, g: 0, b: 0 }; N],
            white: [0; N],
            refreshes: 0,
        }
    }

    #[must_use]
    pub const fn pixels(&self) -> &[RGB8; N] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, index: usize) -> Option<(RGB8, u8)> {
        Some((*self.pixels.get(index)?, *self.white.get(index)?))
    }

    /// Number of `refresh` calls so far.
    #[must_use]
    pub const fn refreshes(&self) -> usize {
        self.refreshes
    }
}

impl<const N: usize> LedSink for StripBuffer<N> {
    fn set_led(&mut self, index: usize, rgb: RGB8, white: u8) {
        if let (Some(pixel), Some(channel)) = (self.pixels.get_mut(index), self.white.get_mut(index))
        {
            *pixel = rgb;
            *channel = white;
        }
    }

    fn refresh(&mut self, _count: usize) {
        self.refreshes += 1;
    }
}
