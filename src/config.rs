//! The persisted display configuration and the small enums it is built from.

use heapless::String;

use crate::color::{DimCurve, LedColor, MAX_BRIGHTNESS};

/// Largest accepted deceleration.
pub const MAX_DECELERATION: u8 = 16;
/// Capacity of the date-ticker format string.
pub const DATE_FORMAT_CAPACITY: usize = 32;

/// Transition between two word layouts.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AnimationMode {
    /// Switch immediately.
    None = 0,
    #[default]
    Fade,
    Roll,
    Explode,
    /// Pick a favourite at random each time.
    Random,
    Snake,
    Teletype,
    Cube,
    Matrix,
    GreenMatrix,
    Drop,
    Squeeze,
    Flicker,
}

impl AnimationMode {
    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::None,
        Self::Fade,
        Self::Roll,
        Self::Explode,
        Self::Random,
        Self::Snake,
        Self::Teletype,
        Self::Cube,
        Self::Matrix,
        Self::GreenMatrix,
        Self::Drop,
        Self::Squeeze,
        Self::Flicker,
    ];

    /// Decode a stored value; unknown values fall back to the default.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        if (value as usize) < Self::COUNT {
            Self::ALL[value as usize]
        } else {
            Self::Fade
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn default_deceleration(self) -> u8 {
        match self {
            Self::None | Self::Random => 0,
            Self::Fade | Self::Teletype | Self::Flicker => 2,
            Self::Snake => 3,
            Self::Roll | Self::Matrix | Self::GreenMatrix | Self::Squeeze => 4,
            Self::Cube | Self::Drop => 6,
            Self::Explode => 8,
        }
    }

    /// Whether the user may tune speed and favourite status.
    #[must_use]
    pub const fn is_configurable(self) -> bool {
        !matches!(self, Self::None | Self::Random)
    }

    const fn default_favourite(self) -> bool {
        matches!(
            self,
            Self::Fade | Self::Roll | Self::Snake | Self::Matrix | Self::Drop
        )
    }
}

/// Continuous color cycling of the display color.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ColorAnimationMode {
    #[default]
    None = 0,
    Rainbow,
    Daylight,
}

impl ColorAnimationMode {
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Rainbow,
            2 => Self::Daylight,
            _ => Self::None,
        }
    }
}

/// What the ambilight ring shows.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum AmbilightMode {
    /// Solid ambilight color.
    #[default]
    Normal = 0,
    /// Seconds as a sweeping arc.
    Clock,
    /// Seconds as an arc growing symmetrically from the top.
    Clock2,
    Rainbow,
    Daylight,
}

impl AmbilightMode {
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Clock,
            2 => Self::Clock2,
            3 => Self::Rainbow,
            4 => Self::Daylight,
            _ => Self::Normal,
        }
    }
}

/// Display option bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayFlags(pub u8);

impl DisplayFlags {
    /// Show "ES IST" at every minute, not only at the full and half hour.
    pub const PERMANENT_IT_IS: u8 = 0x01;
    /// Keep ambilight color equal to display color.
    pub const SYNC_AMBILIGHT: u8 = 0x02;
    /// Mark every fifth ambilight LED in clock modes.
    pub const CLOCK_MARKERS: u8 = 0x04;
    /// Cross-fade neighbouring ambilight LEDs while the seconds arc advances.
    pub const FADE_CLOCK_SECONDS: u8 = 0x08;

    const ALL: u8 =
        Self::PERMANENT_IT_IS | Self::SYNC_AMBILIGHT | Self::CLOCK_MARKERS | Self::FADE_CLOCK_SECONDS;

    #[must_use]
    pub const fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub const fn set(&mut self, flag: u8, on: bool) {
        if on {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }

    /// Drop unknown bits.
    #[must_use]
    pub const fn sanitized(self) -> Self {
        Self(self.0 & Self::ALL)
    }
}

/// Per-animation user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSetting {
    /// Ticks between steps; 0 runs every tick.
    pub deceleration: u8,
    /// Eligible for [`AnimationMode::Random`].
    pub favourite: bool,
}

impl AnimationSetting {
    #[must_use]
    pub const fn default_for(mode: AnimationMode) -> Self {
        Self {
            deceleration: mode.default_deceleration(),
            favourite: mode.default_favourite(),
        }
    }

    /// Replace an out-of-range or unset deceleration with the default.
    #[must_use]
    pub const fn sanitized(self, mode: AnimationMode) -> Self {
        let default = mode.default_deceleration();
        let deceleration = if self.deceleration > MAX_DECELERATION
            || (self.deceleration == 0 && default != 0)
        {
            default
        } else {
            self.deceleration
        };
        Self {
            deceleration,
            favourite: self.favourite && mode.is_configurable(),
        }
    }
}

const fn default_animations() -> [AnimationSetting; AnimationMode::COUNT] {
    let mut settings = [AnimationSetting {
        deceleration: 0,
        favourite: false,
    }; AnimationMode::COUNT];
    let mut index = 0;
    while index < AnimationMode::COUNT {
        settings[index] = AnimationSetting::default_for(AnimationMode::ALL[index]);
        index += 1;
    }
    settings
}

pub const DEFAULT_TICKER_DECELERATION: u8 = 3;
pub const DEFAULT_COLOR_ANIMATION_DECELERATION: u8 = 8;
pub const DEFAULT_BRIGHTNESS: u8 = 8;
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Everything the user can configure, as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Word-table mode (regional phrasing).
    pub display_mode: u8,
    pub animation_mode: AnimationMode,
    pub color_animation_mode: ColorAnimationMode,
    pub ambilight_mode: AmbilightMode,
    pub display_color: LedColor,
    pub ambilight_color: LedColor,
    /// Color of the 5-second markers in ambilight clock modes.
    pub marker_color: LedColor,
    pub display_brightness: u8,
    pub ambilight_brightness: u8,
    pub display_dim_curve: DimCurve,
    pub ambilight_dim_curve: DimCurve,
    pub flags: DisplayFlags,
    pub animations: [AnimationSetting; AnimationMode::COUNT],
    /// Ring position of second 0.
    pub ambilight_offset: u8,
    pub display_power: bool,
    pub ambilight_power: bool,
    pub ticker_deceleration: u8,
    pub color_animation_deceleration: u8,
    /// `%d %m %y %Y %H %M %%` expand in the date ticker.
    pub date_ticker_format: String<DATE_FORMAT_CAPACITY>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut date_ticker_format = String::new();
        // Fits by construction.
        let _ = date_ticker_format.push_str(DEFAULT_DATE_FORMAT);
        Self {
            display_mode: 0,
            animation_mode: AnimationMode::Fade,
            color_animation_mode: ColorAnimationMode::None,
            ambilight_mode: AmbilightMode::Normal,
            display_color: LedColor::rgb(63, 45, 20),
            ambilight_color: LedColor::rgb(63, 45, 20),
            marker_color: LedColor::RED,
            display_brightness: DEFAULT_BRIGHTNESS,
            ambilight_brightness: DEFAULT_BRIGHTNESS,
            display_dim_curve: DimCurve::DEFAULT,
            ambilight_dim_curve: DimCurve::DEFAULT,
            flags: DisplayFlags(DisplayFlags::SYNC_AMBILIGHT | DisplayFlags::CLOCK_MARKERS),
            animations: default_animations(),
            ambilight_offset: 0,
            display_power: true,
            ambilight_power: true,
            ticker_deceleration: DEFAULT_TICKER_DECELERATION,
            color_animation_deceleration: DEFAULT_COLOR_ANIMATION_DECELERATION,
            date_ticker_format,
        }
    }
}

impl DisplayConfig {
    /// Clamp every field into its valid range, replacing unusable values with defaults.
    #[must_use]
    pub fn sanitized(mut self, ambilight_leds: u8) -> Self {
        self.display_color = self.display_color.clamped();
        self.ambilight_color = self.ambilight_color.clamped();
        self.marker_color = self.marker_color.clamped();
        self.display_brightness = self.display_brightness.min(MAX_BRIGHTNESS);
        self.ambilight_brightness = self.ambilight_brightness.min(MAX_BRIGHTNESS);
        self.display_dim_curve = self.display_dim_curve.sanitized();
        self.ambilight_dim_curve = self.ambilight_dim_curve.sanitized();
        self.flags = self.flags.sanitized();
        for (setting, mode) in self.animations.iter_mut().zip(AnimationMode::ALL) {
            *setting = setting.sanitized(mode);
        }
        if ambilight_leds > 0 {
            self.ambilight_offset %= ambilight_leds;
        }
        if self.ticker_deceleration == 0 || self.ticker_deceleration > MAX_DECELERATION {
            self.ticker_deceleration = DEFAULT_TICKER_DECELERATION;
        }
        if self.color_animation_deceleration == 0
            || self.color_animation_deceleration > MAX_DECELERATION
        {
            self.color_animation_deceleration = DEFAULT_COLOR_ANIMATION_DECELERATION;
        }
        self
    }

    #[must_use]
    pub fn animation(&self, mode: AnimationMode) -> AnimationSetting {
        self.animations
            .get(mode.index())
            .copied()
            .unwrap_or_else(|| AnimationSetting::default_for(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_enum_values_fall_back() {
        assert_eq!(AnimationMode::from_u8(200), AnimationMode::Fade);
        assert_eq!(AnimationMode::from_u8(12), AnimationMode::Flicker);
        assert_eq!(AmbilightMode::from_u8(9), AmbilightMode::Normal);
        assert_eq!(ColorAnimationMode::from_u8(2), ColorAnimationMode::Daylight);
    }

    #[test]
    fn modes_index_their_table_slot() {
        for (index, mode) in AnimationMode::ALL.into_iter().enumerate() {
            assert_eq!(mode.index(), index);
            assert_eq!(AnimationMode::from_u8(u8::try_from(index).expect("index fits u8")), mode);
        }
    }

    #[test]
    fn sanitize_restores_defaults() {
        let mut config = DisplayConfig::default();
        config.display_brightness = 40;
        config.animations[AnimationMode::Snake.index()].deceleration = 99;
        config.animations[AnimationMode::Roll.index()].deceleration = 0;
        config.animations[AnimationMode::Random.index()].favourite = true;
        config.ambilight_offset = 75;
        config.ticker_deceleration = 0;
        let config = config.sanitized(60);
        assert_eq!(config.display_brightness, MAX_BRIGHTNESS);
        assert_eq!(config.animation(AnimationMode::Snake).deceleration, 3);
        assert_eq!(config.animation(AnimationMode::Roll).deceleration, 4);
        assert!(!config.animation(AnimationMode::Random).favourite);
        assert_eq!(config.ambilight_offset, 15);
        assert_eq!(config.ticker_deceleration, DEFAULT_TICKER_DECELERATION);
    }

    #[test]
    fn default_is_already_sane() {
        let config = DisplayConfig::default();
        assert_eq!(config.clone().sanitized(60), config);
        assert_eq!(config.date_ticker_format.as_str(), DEFAULT_DATE_FORMAT);
    }
}
