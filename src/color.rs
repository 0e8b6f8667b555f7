//! Logical LED colors, brightness curves and the gamma table that turns them into PWM duty cycles.
//!
//! Every channel is a logical step in `0..=63`. Brightness (`0..=15`) selects an entry of a
//! user-tunable [`DimCurve`], whose value is the dimming factor handed to [`LedColor::dim`]. The
//! result is converted to an 8-bit duty cycle through [`PWM_TABLE8`].

use serde::{Deserialize, Serialize};
use smart_leds::RGB8;

/// Highest logical step of a color channel.
pub const MAX_COLOR_STEP: u8 = 63;
/// Number of brightness levels.
pub const BRIGHTNESS_LEVELS: usize = 16;
/// Highest brightness level.
pub const MAX_BRIGHTNESS: u8 = 15;
/// Number of phases of one rainbow revolution.
pub const RAINBOW_PHASES: u8 = 42;

const RAINBOW_SEGMENT: u8 = RAINBOW_PHASES / 3;

/// Gamma-corrected PWM duty cycle for each logical step (`255 * (step / 63) ^ 2.2`).
///
/// Non-zero steps never map to zero so a dim but configured color stays visible.
pub const PWM_TABLE8: [u8; 64] = [
    0, 1, 1, 1, 1, 1, 1, 2, 3, 4, 4, 5, 7, 8, 9, 11, 13, 14, 16, 18, 20, 23, 25, 28, 31, 33, 36,
    40, 43, 46, 50, 54, 57, 61, 66, 70, 74, 79, 84, 89, 94, 99, 105, 110, 116, 122, 128, 134, 140,
    147, 153, 160, 167, 174, 182, 189, 197, 205, 213, 221, 229, 238, 246, 255,
];

/// An RGB(+W) color in logical steps (`0..=63` per channel).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedColor {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl LedColor {
    /// All channels off.
    pub const OFF: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(MAX_COLOR_STEP, 0, 0);
    pub const GREEN: Self = Self::rgb(0, MAX_COLOR_STEP, 0);
    pub const BLUE: Self = Self::rgb(0, 0, MAX_COLOR_STEP);
    pub const WHITE: Self = Self::rgb(MAX_COLOR_STEP, MAX_COLOR_STEP, MAX_COLOR_STEP);

    #[must_use]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white: 0,
        }
    }

    #[must_use]
    pub const fn rgbw(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Clamp every channel into `0..=63`.
    #[must_use]
    pub const fn clamped(self) -> Self {
        Self {
            red: clamp_step(self.red),
            green: clamp_step(self.green),
            blue: clamp_step(self.blue),
            white: clamp_step(self.white),
        }
    }

    #[must_use]
    pub const fn is_off(self) -> bool {
        self.red == 0 && self.green == 0 && self.blue == 0 && self.white == 0
    }

    /// Scale each channel by `factor / 63`.
    ///
    /// A channel that is non-zero never rounds down to zero, so `dim(color, 0)` keeps every
    /// configured channel at step 1.
    #[must_use]
    pub const fn dim(self, factor: u8) -> Self {
        let factor = clamp_step(factor);
        Self {
            red: dim_channel(self.red, factor),
            green: dim_channel(self.green, factor),
            blue: dim_channel(self.blue, factor),
            white: dim_channel(self.white, factor),
        }
    }

    /// Linear interpolation `self -> to` at `step / steps`.
    #[must_use]
    pub const fn lerp(self, to: Self, step: u8, steps: u8) -> Self {
        if steps == 0 || step >= steps {
            return to;
        }
        Self {
            red: lerp_channel(self.red, to.red, step, steps),
            green: lerp_channel(self.green, to.green, step, steps),
            blue: lerp_channel(self.blue, to.blue, step, steps),
            white: lerp_channel(self.white, to.white, step, steps),
        }
    }

    /// Divide every channel by `divisor` (used for fading trails).
    #[must_use]
    pub const fn divided(self, divisor: u8) -> Self {
        if divisor <= 1 {
            return self;
        }
        Self {
            red: self.red / divisor,
            green: self.green / divisor,
            blue: self.blue / divisor,
            white: self.white / divisor,
        }
    }

    /// Convert to the physical PWM values handed to the LED sink.
    #[must_use]
    pub const fn to_pwm(self) -> (RGB8, u8) {
        let rgb = RGB8 {
            r: pwm(self.red),
            g: pwm(self.green),
            b: pwm(self.blue),
        };
        (rgb, pwm(self.white))
    }
}

/// Gamma table lookup for one logical step.
#[must_use]
pub const fn pwm(step: u8) -> u8 {
    PWM_TABLE8[clamp_step(step) as usize]
}

const fn clamp_step(step: u8) -> u8 {
    if step > MAX_COLOR_STEP {
        MAX_COLOR_STEP
    } else {
        step
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "channel * factor / 63 is at most 63"
)]
const fn dim_channel(channel: u8, factor: u8) -> u8 {
    if channel == 0 {
        return 0;
    }
    let scaled = (clamp_step(channel) as u16 * factor as u16 / MAX_COLOR_STEP as u16) as u8;
    if scaled == 0 { 1 } else { scaled }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "the interpolated value lies between two u8 channels"
)]
const fn lerp_channel(from: u8, to: u8, step: u8, steps: u8) -> u8 {
    let from = from as i16;
    let delta = to as i16 - from;
    (from + delta * step as i16 / steps as i16) as u8
}

/// Brightness level (`0..=15`) to dimming factor (`0..=63`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimCurve(pub [u8; BRIGHTNESS_LEVELS]);

impl DimCurve {
    /// A roughly perceptual default, strictly increasing and ending at full scale.
    pub const DEFAULT: Self = Self([4, 6, 8, 10, 13, 16, 19, 23, 27, 31, 36, 41, 46, 51, 57, 63]);

    /// Dimming factor for `brightness`; out-of-range levels use the brightest entry.
    #[must_use]
    pub fn factor(&self, brightness: u8) -> u8 {
        let index = usize::from(brightness.min(MAX_BRIGHTNESS));
        self.0.get(index).copied().map_or(MAX_COLOR_STEP, clamp_step)
    }

    /// Set one entry, clamped to `0..=63`.
    pub fn set(&mut self, brightness: u8, factor: u8) {
        if let Some(entry) = self.0.get_mut(usize::from(brightness)) {
            *entry = clamp_step(factor);
        }
    }

    /// Clamp every entry into `0..=63`.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.0.iter_mut().for_each(|entry| *entry = clamp_step(*entry));
        self
    }
}

impl Default for DimCurve {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Color at `phase` of the 42-phase hue wheel (red -> green -> blue -> red).
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "offset * 63 / 14 is below 63"
)]
pub const fn rainbow_color(phase: u8) -> LedColor {
    let phase = phase % RAINBOW_PHASES;
    let offset = phase % RAINBOW_SEGMENT;
    let rising = (offset as u16 * MAX_COLOR_STEP as u16 / RAINBOW_SEGMENT as u16) as u8;
    let falling = MAX_COLOR_STEP - rising;
    match phase / RAINBOW_SEGMENT {
        0 => LedColor::rgb(falling, rising, 0),
        1 => LedColor::rgb(0, falling, rising),
        _ => LedColor::rgb(rising, 0, falling),
    }
}

/// Sky color for each hour of the day, used by the daylight color animation.
pub const DAYLIGHT_COLORS: [LedColor; 24] = [
    LedColor::rgb(4, 4, 20),
    LedColor::rgb(4, 4, 18),
    LedColor::rgb(4, 4, 16),
    LedColor::rgb(6, 4, 16),
    LedColor::rgb(10, 6, 18),
    LedColor::rgb(30, 12, 16),
    LedColor::rgb(50, 24, 10),
    LedColor::rgb(63, 40, 16),
    LedColor::rgb(63, 52, 30),
    LedColor::rgb(60, 58, 44),
    LedColor::rgb(56, 60, 56),
    LedColor::rgb(52, 60, 63),
    LedColor::rgb(50, 60, 63),
    LedColor::rgb(52, 60, 63),
    LedColor::rgb(56, 60, 56),
    LedColor::rgb(60, 58, 44),
    LedColor::rgb(63, 52, 30),
    LedColor::rgb(63, 40, 16),
    LedColor::rgb(63, 28, 8),
    LedColor::rgb(48, 16, 12),
    LedColor::rgb(28, 8, 20),
    LedColor::rgb(12, 6, 24),
    LedColor::rgb(6, 4, 22),
    LedColor::rgb(4, 4, 20),
];

/// Daylight color for `hour` (wraps modulo 24).
#[must_use]
pub const fn daylight_color(hour: u8) -> LedColor {
    DAYLIGHT_COLORS[(hour % 24) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dim_keeps_configured_channels_visible() {
        let color = LedColor::rgb(63, 1, 0);
        assert_eq!(color.dim(0), LedColor::rgb(1, 1, 0));
        assert_eq!(color.dim(63), color);
        assert_eq!(LedColor::OFF.dim(63), LedColor::OFF);
    }

    #[test]
    fn dim_is_monotonic_over_default_curve() {
        let curve = DimCurve::DEFAULT;
        let color = LedColor::rgbw(63, 40, 7, 20);
        for low in 0..MAX_BRIGHTNESS {
            let dim_low = color.dim(curve.factor(low));
            let dim_high = color.dim(curve.factor(low + 1));
            assert!(dim_low.red <= dim_high.red);
            assert!(dim_low.green <= dim_high.green);
            assert!(dim_low.blue <= dim_high.blue);
            assert!(dim_low.white <= dim_high.white);
        }
    }

    #[test]
    fn curve_entries_are_clamped() {
        let mut curve = DimCurve::DEFAULT;
        curve.set(3, 200);
        assert_eq!(curve.factor(3), MAX_COLOR_STEP);
        assert_eq!(DimCurve([99; 16]).sanitized(), DimCurve([63; 16]));
    }

    #[test]
    fn pwm_table_is_monotonic_and_full_scale() {
        assert!(PWM_TABLE8.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(pwm(0), 0);
        assert_eq!(pwm(1), 1);
        assert_eq!(pwm(63), 255);
        assert_eq!(pwm(200), 255);
    }

    #[test]
    fn rainbow_wheel_starts_red_and_wraps() {
        assert_eq!(rainbow_color(0), LedColor::RED);
        assert_eq!(rainbow_color(14), LedColor::GREEN);
        assert_eq!(rainbow_color(28), LedColor::BLUE);
        assert_eq!(rainbow_color(42), rainbow_color(0));
    }

    #[test]
    fn lerp_reaches_both_ends() {
        let from = LedColor::rgb(0, 63, 10);
        let to = LedColor::rgb(63, 0, 10);
        assert_eq!(from.lerp(to, 0, 20), from);
        assert_eq!(from.lerp(to, 20, 20), to);
        assert_eq!(from.lerp(to, 10, 20), LedColor::rgb(31, 32, 10));
    }
}
