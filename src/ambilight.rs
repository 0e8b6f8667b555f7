//! The ambilight ring behind the face.

use crate::color::{LedColor, RAINBOW_PHASES, daylight_color, rainbow_color};
use crate::config::{AmbilightMode, DisplayFlags};
use crate::display::DISPLAY_TICK_HZ as TICKS_PER_SECOND;
use crate::led_plane::AMBILIGHT_LED_COUNT;

/// Ambilight LEDs between two second markers.
const MARKER_SPACING: usize = AMBILIGHT_LED_COUNT / 12;

/// Everything the ring renders from, resolved by the display engine each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbilightInput {
    pub mode: AmbilightMode,
    /// Dimmed ambilight color.
    pub color: LedColor,
    /// Dimmed second-marker color.
    pub marker: LedColor,
    /// Ambilight dimming factor, applied to rainbow and daylight colors.
    pub factor: u8,
    pub flags: DisplayFlags,
    /// Ring LED that shows second 0.
    pub offset: u8,
    pub power: bool,
    pub hour: u8,
    /// Ticks per rainbow phase.
    pub deceleration: u8,
}

/// Ring renderer with its own rainbow phase and seconds state.
#[derive(Debug, Clone)]
pub struct Ambilight {
    leds: [LedColor; AMBILIGHT_LED_COUNT],
    second: u8,
    /// Ticks since `second` last changed.
    sub_ticks: u32,
    rainbow_phase: u8,
    rainbow_counter: u8,
}

impl Default for Ambilight {
    fn default() -> Self {
        Self::new()
    }
}

impl Ambilight {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            leds: [LedColor::OFF; AMBILIGHT_LED_COUNT],
            second: 0,
            sub_ticks: 0,
            rainbow_phase: 0,
            rainbow_counter: 0,
        }
    }

    /// Seconds of the current minute, for the clock modes.
    pub fn set_second(&mut self, second: u8) {
        let second = second % 60;
        if second != self.second {
            self.second = second;
            self.sub_ticks = 0;
        }
    }

    #[must_use]
    pub const fn leds(&self) -> &[LedColor; AMBILIGHT_LED_COUNT] {
        &self.leds
    }

    /// Whether every ring LED is off.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.leds.iter().all(|led| led.is_off())
    }

    /// Seconds arc: brightness step (`0..=steps`) of ring position `position`, counted from
    /// second 0.
    fn arc_level(&self, mode: AmbilightMode, position: usize, fade: bool) -> (u32, u32) {
        let second = usize::from(self.second);
        let sub = self.sub_ticks;
        match mode {
            AmbilightMode::Clock2 => {
                // Grows from second 0 in both directions, one LED per side every two seconds.
                let half = second / 2;
                let distance = position.min(AMBILIGHT_LED_COUNT - position);
                if distance <= half {
                    (1, 1)
                } else if fade && distance == half + 1 {
                    let progress = u32::from(second % 2 == 1) * TICKS_PER_SECOND + sub;
                    (progress, 2 * TICKS_PER_SECOND)
                } else {
                    (0, 1)
                }
            }
            _ => {
                let position = position * 60 / AMBILIGHT_LED_COUNT;
                if position <= second {
                    (1, 1)
                } else if fade && position == second + 1 {
                    (sub, TICKS_PER_SECOND)
                } else {
                    (0, 1)
                }
            }
        }
    }

    /// Render one 64 Hz tick. Returns `true` if any LED changed.
    pub fn tick(&mut self, input: &AmbilightInput) -> bool {
        self.sub_ticks += 1;
        if self.sub_ticks >= TICKS_PER_SECOND {
            self.sub_ticks = 0;
            self.second = (self.second + 1) % 60;
        }
        self.rainbow_counter = self.rainbow_counter.saturating_add(1);
        if self.rainbow_counter >= input.deceleration.max(1) {
            self.rainbow_counter = 0;
            self.rainbow_phase = (self.rainbow_phase + 1) % RAINBOW_PHASES;
        }

        let mut next = [LedColor::OFF; AMBILIGHT_LED_COUNT];
        if input.power {
            let fade = input.flags.contains(DisplayFlags::FADE_CLOCK_SECONDS);
            let markers = input.flags.contains(DisplayFlags::CLOCK_MARKERS);
            for (position, color) in next.iter_mut().enumerate() {
                *color = match input.mode {
                    AmbilightMode::Normal => input.color,
                    AmbilightMode::Rainbow => rainbow_color(self.rainbow_phase).dim(input.factor),
                    AmbilightMode::Daylight => daylight_color(input.hour).dim(input.factor),
                    AmbilightMode::Clock | AmbilightMode::Clock2 => {
                        let (level, steps) = self.arc_level(input.mode, position, fade);
                        let base = if markers && position % MARKER_SPACING == 0 {
                            input.marker
                        } else {
                            LedColor::OFF
                        };
                        lerp_wide(base, input.color, level, steps)
                    }
                };
            }
            next.rotate_right(usize::from(input.offset) % AMBILIGHT_LED_COUNT);
        }

        let changed = next != self.leds;
        self.leds = next;
        changed
    }
}

fn lerp_wide(from: LedColor, to: LedColor, level: u32, steps: u32) -> LedColor {
    if level >= steps {
        return to;
    }
    // Scale to the u8 lerp without losing the fade granularity that matters.
    let scaled = u8::try_from(level * 64 / steps.max(1)).unwrap_or(64);
    from.lerp(to, scaled, 64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(mode: AmbilightMode) -> AmbilightInput {
        AmbilightInput {
            mode,
            color: LedColor::BLUE,
            marker: LedColor::RED,
            factor: 63,
            flags: DisplayFlags::default(),
            offset: 0,
            power: true,
            hour: 12,
            deceleration: 1,
        }
    }

    #[test]
    fn clock_sweeps_up_to_the_current_second() {
        let mut ring = Ambilight::new();
        ring.set_second(10);
        ring.tick(&input(AmbilightMode::Clock));
        assert!(ring.leds()[..=10].iter().all(|&led| led == LedColor::BLUE));
        assert!(ring.leds()[11..].iter().all(|led| led.is_off()));
    }

    #[test]
    fn clock_arc_keeps_growing_between_updates() {
        let mut ring = Ambilight::new();
        ring.set_second(15);
        let settings = input(AmbilightMode::Clock);
        for _ in 0..10 * TICKS_PER_SECOND {
            ring.tick(&settings);
        }
        let lit = ring.leds().iter().filter(|led| !led.is_off()).count();
        assert_eq!(lit, 26);
        assert_eq!(ring.leds()[25], LedColor::BLUE);
        assert!(ring.leds()[26].is_off());
    }

    #[test]
    fn clock_arc_restarts_after_the_minute() {
        let mut ring = Ambilight::new();
        ring.set_second(59);
        let settings = input(AmbilightMode::Clock);
        for _ in 0..TICKS_PER_SECOND {
            ring.tick(&settings);
        }
        assert_eq!(ring.leds()[0], LedColor::BLUE);
        assert!(ring.leds()[1..].iter().all(|led| led.is_off()));
    }

    #[test]
    fn offset_rotates_the_ring() {
        let mut ring = Ambilight::new();
        ring.set_second(0);
        let mut settings = input(AmbilightMode::Clock);
        settings.offset = 75;
        ring.tick(&settings);
        assert_eq!(ring.leds()[15], LedColor::BLUE);
        assert!(ring.leds()[0].is_off());
    }

    #[test]
    fn markers_show_under_the_arc() {
        let mut ring = Ambilight::new();
        ring.set_second(2);
        let mut settings = input(AmbilightMode::Clock);
        settings.flags.set(DisplayFlags::CLOCK_MARKERS, true);
        ring.tick(&settings);
        assert_eq!(ring.leds()[0], LedColor::BLUE);
        assert_eq!(ring.leds()[5], LedColor::RED);
        assert!(ring.leds()[6].is_off());
    }

    #[test]
    fn clock2_grows_symmetrically() {
        let mut ring = Ambilight::new();
        ring.set_second(4);
        ring.tick(&input(AmbilightMode::Clock2));
        assert_eq!(ring.leds()[2], LedColor::BLUE);
        assert_eq!(ring.leds()[AMBILIGHT_LED_COUNT - 2], LedColor::BLUE);
        assert!(ring.leds()[3].is_off());
        assert!(ring.leds()[AMBILIGHT_LED_COUNT - 3].is_off());
    }

    #[test]
    fn power_off_darkens_the_ring() {
        let mut ring = Ambilight::new();
        assert!(ring.tick(&input(AmbilightMode::Normal)));
        let mut settings = input(AmbilightMode::Normal);
        settings.power = false;
        assert!(ring.tick(&settings));
        assert!(ring.is_dark());
        assert!(!ring.tick(&settings));
    }
}
