//! The word-clock display engine.
//!
//! [`Display`] owns the configuration, the bit-planes and every renderer, plus the collaborators
//! it drives. Two entry points keep it running:
//!
//! - [`Display::clock`] whenever the time changes (or the display is switched on or off). It
//!   computes the `Target` layout from the word tables and arms a transition.
//! - [`Display::tick`] at 64 Hz. It runs, in priority order, the ticker, an icon or the armed
//!   transition, then the ambient effects (minute LEDs, color cycling, ambilight), and finally
//!   pushes the frame to the LED sink if anything changed.
//!
//! Setters take `do_save` (persist the configuration) and `do_sync` (notify the paired device).

use time::PrimitiveDateTime;

use crate::ambilight::{Ambilight, AmbilightInput};
use crate::animation::{AnimationEngine, Canvas};
use crate::color::{DimCurve, LedColor, MAX_BRIGHTNESS, RAINBOW_PHASES, daylight_color, rainbow_color};
use crate::config::{
    AmbilightMode, AnimationMode, AnimationSetting, ColorAnimationMode, DisplayConfig,
    DisplayFlags, MAX_DECELERATION,
};
use crate::hardware::{LedSink, PowerRail, SyncEvent, SyncNotifier};
use crate::icon::{Icon, IconPlayer, IconProgress};
use crate::led_plane::{
    AMBILIGHT_LED_COUNT, AMBILIGHT_LED_OFFSET, DISPLAY_LAYOUT, DISPLAY_LED_COUNT,
    DISPLAY_LED_OFFSET, LedPlane, MINUTE_LED_COUNT, MINUTE_LED_OFFSET, Plane, STATUS_LED_OFFSET,
    TOTAL_LED_COUNT,
};
use crate::persist::{self, ConfigStore};
use crate::ticker::{Ticker, TickerProgress, format_date};
use crate::word_tables::{MAX_WORDS, WordTables};
use crate::{Error, Result};

/// Rate of [`Display::tick`].
pub const DISPLAY_TICK_HZ: u32 = 64;
/// Ticks after switching the LED supply on before the strip is written (~200 ms).
pub const POWER_SETTLE_TICKS: u8 = 13;
/// Steps of the minute-LED fade.
pub const MINUTE_FADE_STEPS: u8 = 20;

const DISPLAY_MAPPING: [u16; DISPLAY_LED_COUNT] = DISPLAY_LAYOUT.mapping_by_xy();

/// Options of [`Display::clock`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockFlags(pub u8);

impl ClockFlags {
    /// Switch the display on, powering the LED supply first.
    pub const POWER_ON: u8 = 0x01;
    /// Switch the display and ambilight off.
    pub const POWER_OFF: u8 = 0x02;
    /// Recompute the layout and animate even if the words did not change.
    pub const UPDATE_ALL: u8 = 0x04;

    #[must_use]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }
}

/// Which brightness curve a dim-curve setter addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveTarget {
    Display,
    Ambilight,
}

/// The display engine.
pub struct Display<T, L, P, S, C> {
    config: DisplayConfig,
    tables: T,
    sink: L,
    power: P,
    sync: S,
    store: C,

    canvas: Canvas,
    engine: AnimationEngine,
    ticker: Ticker,
    icon: IconPlayer,
    ambilight: Ambilight,

    hour: u8,
    minute: u8,
    /// Hour and five-minute slot of the layout in `Target`.
    shown: Option<(u8, u8)>,
    display_on: bool,
    ambilight_on: bool,
    rail_on: bool,
    settle: u8,
    dirty: bool,

    status: LedColor,
    minute_levels: [u8; MINUTE_LED_COUNT],
    minute_targets: [bool; MINUTE_LED_COUNT],

    /// Display color after color cycling, before dimming.
    display_color: LedColor,
    ambilight_color: LedColor,
    color_phase: u8,
    color_counter: u8,
}

impl<T, L, P, S, C> Display<T, L, P, S, C>
where
    T: WordTables,
    L: LedSink,
    P: PowerRail,
    S: SyncNotifier,
    C: ConfigStore,
{
    /// Load the configuration from `store` (defaults if absent or unreadable) and select its
    /// word-table mode. Nothing is drawn until the first [`Display::clock`] call.
    pub fn new(mut tables: T, sink: L, power: P, sync: S, mut store: C, seed: u64) -> Self {
        let mut config = match persist::load(&mut store) {
            Ok(Some(config)) => config,
            Ok(None) => DisplayConfig::default(),
            Err(_error) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Configuration load failed: {}", defmt::Display2Format(&_error));
                DisplayConfig::default()
            }
        };
        if config.display_mode >= tables.mode_count() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Stored display mode {} unknown, using 0", config.display_mode);
            config.display_mode = 0;
        }
        tables.load(config.display_mode);

        let mut display = Self {
            display_on: config.display_power,
            ambilight_on: config.ambilight_power,
            display_color: config.display_color,
            ambilight_color: config.ambilight_color,
            config,
            tables,
            sink,
            power,
            sync,
            store,
            canvas: Canvas::new(seed),
            engine: AnimationEngine::new(),
            ticker: Ticker::new(),
            icon: IconPlayer::new(),
            ambilight: Ambilight::new(),
            hour: 0,
            minute: 0,
            shown: None,
            rail_on: false,
            settle: 0,
            dirty: true,
            status: LedColor::OFF,
            minute_levels: [0; MINUTE_LED_COUNT],
            minute_targets: [false; MINUTE_LED_COUNT],
            color_phase: 0,
            color_counter: 0,
        };
        display.refresh_colors();
        display.canvas.previous = display.canvas.on;
        display
    }

    #[must_use]
    pub const fn config(&self) -> &DisplayConfig {
        &self.config
    }

    #[must_use]
    pub const fn plane(&self) -> &LedPlane {
        &self.canvas.plane
    }

    #[must_use]
    pub const fn sink(&self) -> &L {
        &self.sink
    }

    pub const fn sink_mut(&mut self) -> &mut L {
        &mut self.sink
    }

    #[must_use]
    pub const fn power_rail(&self) -> &P {
        &self.power
    }

    #[must_use]
    pub const fn notifier(&self) -> &S {
        &self.sync
    }

    #[must_use]
    pub const fn store(&self) -> &C {
        &self.store
    }

    #[must_use]
    pub const fn tables(&self) -> &T {
        &self.tables
    }

    /// Logical color of the status LED.
    #[must_use]
    pub const fn status_color(&self) -> LedColor {
        self.status
    }

    /// Undimmed display color in effect now, including color cycling.
    #[must_use]
    pub const fn display_color(&self) -> LedColor {
        self.display_color
    }

    /// Undimmed ambilight color in effect now.
    #[must_use]
    pub const fn ambilight_color(&self) -> LedColor {
        self.ambilight_color
    }

    /// Logical colors of the minute LEDs.
    #[must_use]
    pub fn minute_colors(&self) -> [LedColor; MINUTE_LED_COUNT] {
        let on = self.canvas.on;
        self.minute_levels
            .map(|level| LedColor::OFF.lerp(on, level, MINUTE_FADE_STEPS))
    }

    #[must_use]
    pub const fn ambilight_leds(&self) -> &[LedColor; AMBILIGHT_LED_COUNT] {
        self.ambilight.leds()
    }

    /// Whether a transition is pending or running.
    #[must_use]
    pub const fn animation_active(&self) -> bool {
        self.engine.is_active()
    }

    /// The animation running now, resolved from [`AnimationMode::Random`].
    #[must_use]
    pub const fn running_animation(&self) -> AnimationMode {
        self.engine.running_mode()
    }

    #[must_use]
    pub const fn ticker_active(&self) -> bool {
        self.ticker.is_active()
    }

    /// Index of the character the ticker is scrolling in.
    #[must_use]
    pub fn ticker_position(&self) -> Option<usize> {
        self.ticker.position()
    }

    #[must_use]
    pub fn ticker_char(&self) -> Option<char> {
        self.ticker.current_char()
    }

    #[must_use]
    pub const fn icon_active(&self) -> bool {
        self.icon.is_active()
    }

    /// Whether the ticks since the last power-on are still inside the settle window.
    #[must_use]
    pub const fn settling(&self) -> bool {
        self.settle > 0
    }

    /// Show `hour:minute`.
    ///
    /// Returns `false` if the word tables are not ready; the status LED then turns blue and the
    /// layout is left alone.
    pub fn clock(&mut self, hour: u8, minute: u8, flags: ClockFlags) -> bool {
        self.hour = hour % 24;
        self.minute = minute % 60;

        if flags.contains(ClockFlags::POWER_ON) {
            self.display_on = true;
            self.ambilight_on = self.config.ambilight_power;
        }
        if flags.contains(ClockFlags::POWER_OFF) {
            self.display_on = false;
            self.ambilight_on = false;
        }
        if self.display_on || self.ambilight_on {
            self.ensure_power();
        }

        if !self.tables.complete() {
            #[cfg(feature = "defmt")]
            defmt::warn!("Word tables not loaded");
            self.status = LedColor::BLUE.dim(self.display_factor());
            self.dirty = true;
            return false;
        }
        if !self.status.is_off() {
            self.status = LedColor::OFF;
            self.dirty = true;
        }

        if self.config.color_animation_mode == ColorAnimationMode::Daylight {
            self.display_color = daylight_color(self.hour);
            if self.config.flags.contains(DisplayFlags::SYNC_AMBILIGHT) {
                self.ambilight_color = self.display_color;
            }
            self.refresh_colors();
        }

        self.update_minute_leds();

        let slot = (self.hour, self.minute / 5);
        let force = flags.0 & (ClockFlags::UPDATE_ALL | ClockFlags::POWER_ON | ClockFlags::POWER_OFF) != 0;
        if force || self.shown != Some(slot) {
            if !self.render_target() {
                return false;
            }
            self.shown = Some(slot);
            self.engine.arm();
        }
        true
    }

    /// Seconds of the current minute, for the ambilight clock modes.
    pub fn set_second(&mut self, second: u8) {
        self.ambilight.set_second(second);
    }

    fn show_it_is(&self) -> bool {
        self.config.flags.contains(DisplayFlags::PERMANENT_IT_IS)
            || self.minute < 5
            || (30..35).contains(&self.minute)
    }

    /// Recompute `Target` for the stored time. `false` if the tables refused.
    fn render_target(&mut self) -> bool {
        self.canvas.plane.fill(Plane::Target, false);
        if !self.display_on {
            return true;
        }
        let mut words = [false; MAX_WORDS];
        if !self
            .tables
            .fill_words(&mut words, self.hour, self.minute, self.show_it_is())
        {
            self.status = LedColor::BLUE.dim(self.display_factor());
            self.dirty = true;
            return false;
        }
        for (index, _) in words.iter().enumerate().filter(|(_, on)| **on) {
            if let Some(rect) = self.tables.word_rect(index) {
                for (row, col) in rect.cells() {
                    self.canvas.plane.set(row, col, Plane::Target, true);
                }
            }
        }
        true
    }

    fn update_minute_leds(&mut self) {
        let count = usize::from(self.minute % 5);
        for (index, target) in self.minute_targets.iter_mut().enumerate() {
            *target = self.display_on && index < count;
        }
    }

    fn ensure_power(&mut self) {
        if !self.rail_on {
            #[cfg(feature = "defmt")]
            defmt::info!("LED power on");
            self.power.power_on();
            self.rail_on = true;
            self.settle = POWER_SETTLE_TICKS;
            self.dirty = true;
        }
    }

    /// Advance everything by one 64 Hz tick.
    pub fn tick(&mut self) {
        if self.settle > 0 {
            self.settle -= 1;
            return;
        }

        if self.ticker.is_active() {
            match self.ticker.tick(&mut self.canvas, self.config.ticker_deceleration) {
                TickerProgress::Scrolled => self.dirty = true,
                TickerProgress::Finished => {
                    self.canvas.plane.copy(Plane::New, Plane::Current);
                    self.engine.arm();
                    self.dirty = true;
                }
                TickerProgress::Idle | TickerProgress::Waiting => {}
            }
        } else if self.icon.is_active() {
            match self.icon.tick(&mut self.canvas) {
                IconProgress::Drew => self.dirty = true,
                IconProgress::Finished => {
                    self.canvas.plane.fill(Plane::Current, false);
                    self.engine.arm();
                    self.dirty = true;
                }
                IconProgress::Idle => {}
            }
        } else if self.engine.tick(&mut self.canvas, &self.config) {
            self.dirty = true;
        }

        self.ambient_tick();
        self.ambilight_tick();
        self.power_down_if_idle();

        if self.dirty {
            self.flush();
        }
    }

    fn ambient_tick(&mut self) {
        for (level, &target) in self.minute_levels.iter_mut().zip(&self.minute_targets) {
            if target && *level < MINUTE_FADE_STEPS {
                *level += 1;
                self.dirty = true;
            } else if !target && *level > 0 {
                *level -= 1;
                self.dirty = true;
            }
        }

        if self.config.color_animation_mode == ColorAnimationMode::Rainbow {
            self.color_counter = self.color_counter.saturating_add(1);
            if self.color_counter >= self.config.color_animation_deceleration {
                self.color_counter = 0;
                self.color_phase = (self.color_phase + 1) % RAINBOW_PHASES;
                self.display_color = rainbow_color(self.color_phase);
                if self.config.flags.contains(DisplayFlags::SYNC_AMBILIGHT) {
                    self.ambilight_color = self.display_color;
                }
                self.refresh_colors();
            }
        }
    }

    fn ambilight_tick(&mut self) {
        let input = AmbilightInput {
            mode: self.config.ambilight_mode,
            color: self.ambilight_color.dim(self.ambilight_factor()),
            marker: self.config.marker_color.dim(self.ambilight_factor()),
            factor: self.ambilight_factor(),
            flags: self.config.flags,
            offset: self.config.ambilight_offset,
            power: self.ambilight_on,
            hour: self.hour,
            deceleration: self.config.color_animation_deceleration,
        };
        if self.ambilight.tick(&input) {
            self.dirty = true;
        }
    }

    fn power_down_if_idle(&mut self) {
        let idle = !self.display_on
            && !self.ambilight_on
            && self.rail_on
            && !self.engine.is_active()
            && !self.ticker.is_active()
            && !self.icon.is_active()
            && self.minute_levels.iter().all(|&level| level == 0)
            && self.ambilight.is_dark();
        if idle {
            // Push the dark frame before cutting the supply.
            self.flush();
            #[cfg(feature = "defmt")]
            defmt::info!("LED power off");
            self.power.power_off();
            self.rail_on = false;
        }
    }

    fn flush(&mut self) {
        let (rgb, white) = self.status.to_pwm();
        self.sink.set_led(STATUS_LED_OFFSET, rgb, white);
        for (index, color) in self.minute_colors().into_iter().enumerate() {
            let (rgb, white) = color.to_pwm();
            self.sink.set_led(MINUTE_LED_OFFSET + index, rgb, white);
        }
        for (index, color) in self.canvas.frame.iter().enumerate() {
            let led = DISPLAY_MAPPING
                .get(index)
                .map_or(index, |&led| usize::from(led));
            let (rgb, white) = color.to_pwm();
            self.sink.set_led(DISPLAY_LED_OFFSET + led, rgb, white);
        }
        for (index, color) in self.ambilight.leds().iter().enumerate() {
            let (rgb, white) = color.to_pwm();
            self.sink.set_led(AMBILIGHT_LED_OFFSET + index, rgb, white);
        }
        self.sink.refresh(TOTAL_LED_COUNT);
        self.dirty = false;
    }

    fn display_factor(&self) -> u8 {
        self.config
            .display_dim_curve
            .factor(self.config.display_brightness)
    }

    fn ambilight_factor(&self) -> u8 {
        self.config
            .ambilight_dim_curve
            .factor(self.config.ambilight_brightness)
    }

    /// Recompute the dimmed colors and repaint a steady face.
    fn refresh_colors(&mut self) {
        self.canvas.factor = self.display_factor();
        self.canvas.on = self.display_color.dim(self.canvas.factor);
        if !self.engine.is_active() && !self.ticker.is_active() && !self.icon.is_active() {
            self.canvas.previous = self.canvas.on;
            self.canvas.show_current();
        }
        self.dirty = true;
    }

    /// Persist the configuration; failures are logged and otherwise ignored.
    pub fn save(&mut self) {
        if let Err(_error) = persist::save(&mut self.store, &self.config) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Configuration save failed: {}", defmt::Display2Format(&_error));
        }
    }

    fn finish_change(&mut self, do_save: bool, do_sync: bool, event: SyncEvent) {
        if do_save {
            self.save();
        }
        if do_sync {
            self.sync.notify(event);
        }
    }

    /// Rebuild the layout for the current time and animate to it.
    fn relayout(&mut self) {
        if self.shown.is_some() && self.tables.complete() && self.render_target() {
            self.engine.arm();
        }
    }

    /// Select word-table mode `mode`. Selecting the active mode does nothing.
    pub fn set_display_mode(&mut self, mode: u8, do_save: bool, do_sync: bool) {
        if mode == self.config.display_mode || mode >= self.tables.mode_count() {
            return;
        }
        self.config.display_mode = mode;
        self.tables.load(mode);
        self.relayout();
        self.finish_change(do_save, do_sync, SyncEvent::DisplayMode(mode));
    }

    pub fn set_animation_mode(&mut self, mode: AnimationMode, do_save: bool, do_sync: bool) {
        if mode == self.config.animation_mode {
            return;
        }
        self.config.animation_mode = mode;
        self.finish_change(do_save, do_sync, SyncEvent::AnimationMode(mode));
    }

    /// Speed and favourite status of one animation.
    pub fn set_animation_setting(
        &mut self,
        mode: AnimationMode,
        setting: AnimationSetting,
        do_save: bool,
        do_sync: bool,
    ) {
        if !mode.is_configurable() {
            return;
        }
        let setting = AnimationSetting {
            deceleration: setting.deceleration.min(MAX_DECELERATION),
            favourite: setting.favourite,
        };
        if let Some(slot) = self.config.animations.get_mut(mode.index()) {
            *slot = setting;
        }
        self.finish_change(do_save, do_sync, SyncEvent::AnimationSetting(mode, setting));
    }

    pub fn set_color_animation_mode(
        &mut self,
        mode: ColorAnimationMode,
        do_save: bool,
        do_sync: bool,
    ) {
        if mode == self.config.color_animation_mode {
            return;
        }
        self.config.color_animation_mode = mode;
        self.display_color = match mode {
            ColorAnimationMode::None => self.config.display_color,
            ColorAnimationMode::Rainbow => rainbow_color(self.color_phase),
            ColorAnimationMode::Daylight => daylight_color(self.hour),
        };
        self.ambilight_color = if self.config.flags.contains(DisplayFlags::SYNC_AMBILIGHT) {
            self.display_color
        } else {
            self.config.ambilight_color
        };
        self.refresh_colors();
        self.finish_change(do_save, do_sync, SyncEvent::ColorAnimationMode(mode));
    }

    /// Ticks per color-cycling phase, `1..=16`.
    pub fn set_color_animation_deceleration(&mut self, deceleration: u8, do_save: bool, do_sync: bool) {
        let deceleration = deceleration.clamp(1, MAX_DECELERATION);
        self.config.color_animation_deceleration = deceleration;
        self.finish_change(
            do_save,
            do_sync,
            SyncEvent::ColorAnimationDeceleration(deceleration),
        );
    }

    pub fn set_ambilight_mode(&mut self, mode: AmbilightMode, do_save: bool, do_sync: bool) {
        if mode == self.config.ambilight_mode {
            return;
        }
        self.config.ambilight_mode = mode;
        self.finish_change(do_save, do_sync, SyncEvent::AmbilightMode(mode));
    }

    /// Display color; with [`DisplayFlags::SYNC_AMBILIGHT`] the ambilight follows.
    pub fn set_display_color(&mut self, color: LedColor, do_save: bool, do_sync: bool) {
        let color = color.clamped();
        self.config.display_color = color;
        if self.config.color_animation_mode == ColorAnimationMode::None {
            self.display_color = color;
        }
        if self.config.flags.contains(DisplayFlags::SYNC_AMBILIGHT) {
            self.config.ambilight_color = color;
            self.ambilight_color = self.display_color;
        }
        self.refresh_colors();
        self.finish_change(do_save, do_sync, SyncEvent::DisplayColor(color));
    }

    /// Ambilight color; with [`DisplayFlags::SYNC_AMBILIGHT`] the display follows and both colors
    /// are reported.
    pub fn set_ambilight_color(&mut self, color: LedColor, do_save: bool, do_sync: bool) {
        let color = color.clamped();
        let linked = self.config.flags.contains(DisplayFlags::SYNC_AMBILIGHT);
        self.config.ambilight_color = color;
        self.ambilight_color = color;
        self.dirty = true;
        if linked {
            self.config.display_color = color;
            if self.config.color_animation_mode == ColorAnimationMode::None {
                self.display_color = color;
            }
            self.refresh_colors();
        }
        self.finish_change(do_save, do_sync, SyncEvent::AmbilightColor(color));
        if linked && do_sync {
            self.sync.notify(SyncEvent::DisplayColor(color));
        }
    }

    pub fn set_marker_color(&mut self, color: LedColor, do_save: bool, do_sync: bool) {
        let color = color.clamped();
        self.config.marker_color = color;
        self.finish_change(do_save, do_sync, SyncEvent::MarkerColor(color));
    }

    pub fn set_display_brightness(&mut self, brightness: u8, do_save: bool, do_sync: bool) {
        let brightness = brightness.min(MAX_BRIGHTNESS);
        self.config.display_brightness = brightness;
        self.refresh_colors();
        self.finish_change(do_save, do_sync, SyncEvent::DisplayBrightness(brightness));
    }

    pub fn set_ambilight_brightness(&mut self, brightness: u8, do_save: bool, do_sync: bool) {
        let brightness = brightness.min(MAX_BRIGHTNESS);
        self.config.ambilight_brightness = brightness;
        self.dirty = true;
        self.finish_change(do_save, do_sync, SyncEvent::AmbilightBrightness(brightness));
    }

    /// Set the dimming factor used at `brightness` (clamped to `0..=63`).
    pub fn set_dim_curve_entry(
        &mut self,
        target: CurveTarget,
        brightness: u8,
        factor: u8,
        do_save: bool,
        do_sync: bool,
    ) {
        let curve: &mut DimCurve = match target {
            CurveTarget::Display => &mut self.config.display_dim_curve,
            CurveTarget::Ambilight => &mut self.config.ambilight_dim_curve,
        };
        curve.set(brightness, factor);
        let curve = *curve;
        self.refresh_colors();
        let event = match target {
            CurveTarget::Display => SyncEvent::DisplayDimCurve(curve),
            CurveTarget::Ambilight => SyncEvent::AmbilightDimCurve(curve),
        };
        self.finish_change(do_save, do_sync, event);
    }

    /// Persistent power state of the letter matrix.
    pub fn set_display_power(&mut self, on: bool, do_save: bool, do_sync: bool) {
        self.config.display_power = on;
        let flags = if on {
            ClockFlags::POWER_ON
        } else {
            self.display_on = false;
            ClockFlags::UPDATE_ALL
        };
        self.clock(self.hour, self.minute, ClockFlags(flags));
        self.finish_change(do_save, do_sync, SyncEvent::DisplayPower(on));
    }

    /// Persistent power state of the ambilight ring.
    pub fn set_ambilight_power(&mut self, on: bool, do_save: bool, do_sync: bool) {
        self.config.ambilight_power = on;
        self.ambilight_on = on;
        if on {
            self.ensure_power();
        }
        self.finish_change(do_save, do_sync, SyncEvent::AmbilightPower(on));
    }

    pub fn set_flags(&mut self, flags: DisplayFlags, do_save: bool, do_sync: bool) {
        let flags = flags.sanitized();
        let it_is_changed = (flags.0 ^ self.config.flags.0) & DisplayFlags::PERMANENT_IT_IS != 0;
        self.config.flags = flags;
        if flags.contains(DisplayFlags::SYNC_AMBILIGHT) {
            self.config.ambilight_color = self.config.display_color;
            self.ambilight_color = self.display_color;
        }
        if it_is_changed {
            self.relayout();
        }
        self.dirty = true;
        self.finish_change(do_save, do_sync, SyncEvent::Flags(flags));
    }

    /// Ticks per ticker column, `1..=16`.
    pub fn set_ticker_deceleration(&mut self, deceleration: u8, do_save: bool, do_sync: bool) {
        let deceleration = deceleration.clamp(1, MAX_DECELERATION);
        self.config.ticker_deceleration = deceleration;
        self.finish_change(do_save, do_sync, SyncEvent::TickerDeceleration(deceleration));
    }

    /// Ring LED that shows second 0.
    pub fn set_ambilight_offset(&mut self, offset: u8, do_save: bool, do_sync: bool) {
        let offset = u8::try_from(usize::from(offset) % AMBILIGHT_LED_COUNT).unwrap_or(0);
        self.config.ambilight_offset = offset;
        self.dirty = true;
        self.finish_change(do_save, do_sync, SyncEvent::AmbilightOffset(offset));
    }

    /// # Errors
    ///
    /// Returns [`Error::TickerTooLong`] if `format` does not fit the format buffer.
    pub fn set_date_ticker_format(&mut self, format: &str, do_save: bool) -> Result<()> {
        let mut stored = heapless::String::new();
        stored.push_str(format).map_err(|()| Error::TickerTooLong)?;
        self.config.date_ticker_format = stored;
        if do_save {
            self.save();
        }
        Ok(())
    }

    /// Scroll `text` across the face; the clock comes back with a transition afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TickerTooLong`] if `text` exceeds the ticker buffer.
    pub fn set_ticker(&mut self, text: &str) -> Result<()> {
        self.ticker.set_text(text)?;
        self.icon.clear();
        Ok(())
    }

    /// Scroll `text` to the end before returning, calling `wait` between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TickerTooLong`] if `text` exceeds the ticker buffer.
    pub fn show_ticker_blocking(&mut self, text: &str, mut wait: impl FnMut()) -> Result<()> {
        self.set_ticker(text)?;
        while self.ticker.is_active() {
            self.tick();
            wait();
        }
        Ok(())
    }

    /// Scroll `date` formatted with the configured date-ticker format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TickerTooLong`] if the formatted date exceeds the ticker buffer.
    pub fn show_date_ticker(&mut self, date: &PrimitiveDateTime) -> Result<()> {
        let text = format_date(&self.config.date_ticker_format, date)?;
        self.set_ticker(&text)
    }

    /// Fade `icon` in, hold it and fade it out; the clock comes back with a transition.
    pub fn show_icon(&mut self, icon: Icon) {
        self.icon.show(icon);
    }
}
