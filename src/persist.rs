//! Versioned storage of [`DisplayConfig`] in a byte-addressed configuration store.
//!
//! Layout (little endian):
//!
//! ```text
//! offset 0   magic    u32  'WCCF'
//! offset 4   version  u16
//! offset 6   length   u16  payload bytes
//! offset 8   crc      u32  CRC-32 of the payload
//! offset 12  payload
//! ```
//!
//! The payload is a sequence of fixed-size slots, one per entry of [`FIELDS`] whose first
//! version is not newer than the record's version. Each slot holds the field encoded with
//! `postcard`, zero padded. Older records therefore load with later fields left at their
//! defaults.

use crc32fast::Hasher;

use crate::config::{AnimationMode, AnimationSetting, DisplayConfig};
use crate::led_plane::AMBILIGHT_LED_COUNT;
use crate::{Error, Result};

const MAGIC: u32 = 0x5743_4346; // 'WCCF'
/// Schema version written by [`save`].
pub const CURRENT_VERSION: u16 = 4;

const VERSION_OFFSET: usize = 4;
const LENGTH_OFFSET: usize = 6;
const CRC_OFFSET: usize = 8;
/// Bytes in front of the payload.
pub const HEADER_LEN: usize = 12;

/// Where the record starts in the store.
pub const RECORD_OFFSET: usize = 0;

/// Byte-addressed persistent storage, e.g. an EEPROM.
pub trait ConfigStore {
    /// Whether the store can be used at all.
    fn is_up(&self) -> bool;

    /// Fill `buffer` from `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageIo`] if the underlying device read fails.
    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<()>;

    /// Write `buffer` at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageIo`] if the underlying device write fails.
    fn write(&mut self, offset: usize, buffer: &[u8]) -> Result<()>;
}

/// In-memory [`ConfigStore`]; starts erased (`0xFF`). Accesses past `N` fail with
/// [`Error::StorageIo`].
#[derive(Debug, Clone)]
pub struct RamStore<const N: usize> {
    bytes: [u8; N],
    writes: usize,
    up: bool,
}

impl<const N: usize> Default for RamStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RamStore<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0xFF; N],
            writes: 0,
            up: true,
        }
    }

    /// Number of successful `write` calls so far.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    pub const fn set_up(&mut self, up: bool) {
        self.up = up;
    }

    #[must_use]
    pub const fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    pub const fn bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.bytes
    }
}

impl<const N: usize> ConfigStore for RamStore<N> {
    fn is_up(&self) -> bool {
        self.up
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<()> {
        let source = offset
            .checked_add(buffer.len())
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(Error::StorageIo)?;
        buffer.copy_from_slice(source);
        Ok(())
    }

    fn write(&mut self, offset: usize, buffer: &[u8]) -> Result<()> {
        let target = offset
            .checked_add(buffer.len())
            .and_then(|end| self.bytes.get_mut(offset..end))
            .ok_or(Error::StorageIo)?;
        target.copy_from_slice(buffer);
        self.writes += 1;
        Ok(())
    }
}

/// One persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DisplayMode,
    AnimationMode,
    DisplayColor,
    DisplayBrightness,
    Flags,
    DisplayPower,
    AmbilightPower,
    AmbilightMode,
    AmbilightColor,
    AmbilightBrightness,
    ColorAnimationMode,
    Animations,
    DisplayDimCurve,
    AmbilightDimCurve,
    TickerDeceleration,
    AmbilightOffset,
    DateTickerFormat,
    MarkerColor,
    ColorAnimationDeceleration,
}

/// A field, its slot size and the schema version that introduced it.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub field: Field,
    pub len: usize,
    pub since: u16,
}

const fn slot(field: Field, len: usize, since: u16) -> Slot {
    Slot { field, len, since }
}

/// Record layout, in payload order.
#[rustfmt::skip]
pub const FIELDS: [Slot; 19] = [
    slot(Field::DisplayMode, 1, 1),
    slot(Field::AnimationMode, 1, 1),
    slot(Field::DisplayColor, 4, 1),
    slot(Field::DisplayBrightness, 1, 1),
    slot(Field::Flags, 1, 1),
    slot(Field::DisplayPower, 1, 1),
    slot(Field::AmbilightPower, 1, 1),
    slot(Field::AmbilightMode, 1, 2),
    slot(Field::AmbilightColor, 4, 2),
    slot(Field::AmbilightBrightness, 1, 2),
    slot(Field::ColorAnimationMode, 1, 2),
    slot(Field::Animations, 2 * AnimationMode::COUNT, 3),
    slot(Field::DisplayDimCurve, 16, 3),
    slot(Field::AmbilightDimCurve, 16, 3),
    slot(Field::TickerDeceleration, 1, 3),
    slot(Field::AmbilightOffset, 1, 3),
    slot(Field::DateTickerFormat, 34, 4),
    slot(Field::MarkerColor, 4, 4),
    slot(Field::ColorAnimationDeceleration, 1, 4),
];

/// Payload bytes of a record of `version`.
#[must_use]
pub const fn payload_len(version: u16) -> usize {
    let mut len = 0;
    let mut index = 0;
    while index < FIELDS.len() {
        if FIELDS[index].since <= version {
            len += FIELDS[index].len;
        }
        index += 1;
    }
    len
}

/// Bytes of a current-version record.
pub const RECORD_LEN: usize = HEADER_LEN + payload_len(CURRENT_VERSION);

fn encode_field(config: &DisplayConfig, field: Field, slot: &mut [u8]) -> Result<()> {
    let animations = config
        .animations
        .map(|setting| (setting.deceleration, setting.favourite));
    match field {
        Field::DisplayMode => postcard::to_slice(&config.display_mode, slot)?,
        Field::AnimationMode => postcard::to_slice(&(config.animation_mode as u8), slot)?,
        Field::DisplayColor => postcard::to_slice(&config.display_color, slot)?,
        Field::DisplayBrightness => postcard::to_slice(&config.display_brightness, slot)?,
        Field::Flags => postcard::to_slice(&config.flags.0, slot)?,
        Field::DisplayPower => postcard::to_slice(&config.display_power, slot)?,
        Field::AmbilightPower => postcard::to_slice(&config.ambilight_power, slot)?,
        Field::AmbilightMode => postcard::to_slice(&(config.ambilight_mode as u8), slot)?,
        Field::AmbilightColor => postcard::to_slice(&config.ambilight_color, slot)?,
        Field::AmbilightBrightness => postcard::to_slice(&config.ambilight_brightness, slot)?,
        Field::ColorAnimationMode => {
            postcard::to_slice(&(config.color_animation_mode as u8), slot)?
        }
        Field::Animations => postcard::to_slice(&animations, slot)?,
        Field::DisplayDimCurve => postcard::to_slice(&config.display_dim_curve, slot)?,
        Field::AmbilightDimCurve => postcard::to_slice(&config.ambilight_dim_curve, slot)?,
        Field::TickerDeceleration => postcard::to_slice(&config.ticker_deceleration, slot)?,
        Field::AmbilightOffset => postcard::to_slice(&config.ambilight_offset, slot)?,
        Field::DateTickerFormat => postcard::to_slice(&config.date_ticker_format, slot)?,
        Field::MarkerColor => postcard::to_slice(&config.marker_color, slot)?,
        Field::ColorAnimationDeceleration => {
            postcard::to_slice(&config.color_animation_deceleration, slot)?
        }
    };
    Ok(())
}

fn decode_field(config: &mut DisplayConfig, field: Field, slot: &[u8]) -> Result<()> {
    use crate::config::{AmbilightMode, ColorAnimationMode, DisplayFlags};

    match field {
        Field::DisplayMode => config.display_mode = postcard::from_bytes(slot)?,
        Field::AnimationMode => {
            config.animation_mode = AnimationMode::from_u8(postcard::from_bytes(slot)?);
        }
        Field::DisplayColor => config.display_color = postcard::from_bytes(slot)?,
        Field::DisplayBrightness => config.display_brightness = postcard::from_bytes(slot)?,
        Field::Flags => config.flags = DisplayFlags(postcard::from_bytes(slot)?),
        Field::DisplayPower => config.display_power = postcard::from_bytes(slot)?,
        Field::AmbilightPower => config.ambilight_power = postcard::from_bytes(slot)?,
        Field::AmbilightMode => {
            config.ambilight_mode = AmbilightMode::from_u8(postcard::from_bytes(slot)?);
        }
        Field::AmbilightColor => config.ambilight_color = postcard::from_bytes(slot)?,
        Field::AmbilightBrightness => config.ambilight_brightness = postcard::from_bytes(slot)?,
        Field::ColorAnimationMode => {
            config.color_animation_mode = ColorAnimationMode::from_u8(postcard::from_bytes(slot)?);
        }
        Field::Animations => {
            let settings: [(u8, bool); AnimationMode::COUNT] = postcard::from_bytes(slot)?;
            config.animations = settings.map(|(deceleration, favourite)| AnimationSetting {
                deceleration,
                favourite,
            });
        }
        Field::DisplayDimCurve => config.display_dim_curve = postcard::from_bytes(slot)?,
        Field::AmbilightDimCurve => config.ambilight_dim_curve = postcard::from_bytes(slot)?,
        Field::TickerDeceleration => config.ticker_deceleration = postcard::from_bytes(slot)?,
        Field::AmbilightOffset => config.ambilight_offset = postcard::from_bytes(slot)?,
        Field::DateTickerFormat => config.date_ticker_format = postcard::from_bytes(slot)?,
        Field::MarkerColor => config.marker_color = postcard::from_bytes(slot)?,
        Field::ColorAnimationDeceleration => {
            config.color_animation_deceleration = postcard::from_bytes(slot)?;
        }
    }
    Ok(())
}

/// Serialize `config` as a record of schema `version` into `buffer`.
///
/// Returns the record length. Writing an older `version` is how migration tests produce
/// legacy records.
///
/// # Errors
///
/// Returns [`Error::IndexOutOfBounds`] if `buffer` is too small or `version` is unknown, and
/// [`Error::FormatError`] if a field does not fit its slot.
pub fn encode_record(config: &DisplayConfig, version: u16, buffer: &mut [u8]) -> Result<usize> {
    if version == 0 || version > CURRENT_VERSION {
        return Err(Error::IndexOutOfBounds);
    }
    let payload_len = payload_len(version);
    let record_len = HEADER_LEN + payload_len;
    let record = buffer
        .get_mut(..record_len)
        .ok_or(Error::IndexOutOfBounds)?;
    record.fill(0);

    let (header, payload) = record.split_at_mut(HEADER_LEN);
    let mut offset = 0;
    for slot in FIELDS.iter().filter(|slot| slot.since <= version) {
        let target = payload
            .get_mut(offset..offset + slot.len)
            .ok_or(Error::IndexOutOfBounds)?;
        encode_field(config, slot.field, target)?;
        offset += slot.len;
    }

    let length = u16::try_from(payload_len).map_err(|_| Error::FormatError)?;
    header[..VERSION_OFFSET].copy_from_slice(&MAGIC.to_le_bytes());
    header[VERSION_OFFSET..LENGTH_OFFSET].copy_from_slice(&version.to_le_bytes());
    header[LENGTH_OFFSET..CRC_OFFSET].copy_from_slice(&length.to_le_bytes());
    header[CRC_OFFSET..HEADER_LEN].copy_from_slice(&compute_crc(payload).to_le_bytes());
    Ok(record_len)
}

/// Parsed header: `Some((version, payload length, crc))` if the magic matches.
fn parse_header(header: &[u8; HEADER_LEN]) -> Option<(u16, usize, u32)> {
    let [m0, m1, m2, m3, v0, v1, l0, l1, c0, c1, c2, c3] = *header;
    if u32::from_le_bytes([m0, m1, m2, m3]) != MAGIC {
        return None;
    }
    Some((
        u16::from_le_bytes([v0, v1]),
        usize::from(u16::from_le_bytes([l0, l1])),
        u32::from_le_bytes([c0, c1, c2, c3]),
    ))
}

/// Load the configuration record.
///
/// Returns `Ok(None)` when no record was ever written or the record is from a newer schema; the
/// caller keeps its defaults. Fields missing from older records keep their defaults, and every
/// field is sanitized.
///
/// # Errors
///
/// Returns [`Error::StorageUnavailable`] if the store is down, [`Error::StorageCorrupted`] on a
/// length or CRC mismatch, and propagates store and decode errors.
pub fn load(store: &mut impl ConfigStore) -> Result<Option<DisplayConfig>> {
    if !store.is_up() {
        return Err(Error::StorageUnavailable);
    }

    let mut header = [0u8; HEADER_LEN];
    store.read(RECORD_OFFSET, &mut header)?;
    let Some((version, length, crc_stored)) = parse_header(&header) else {
        #[cfg(feature = "defmt")]
        defmt::info!("No configuration record, using defaults");
        return Ok(None);
    };
    if version == 0 || version > CURRENT_VERSION {
        #[cfg(feature = "defmt")]
        defmt::warn!("Configuration record version {} unknown, using defaults", version);
        return Ok(None);
    }
    if length != payload_len(version) {
        return Err(Error::StorageCorrupted);
    }

    let mut buffer = [0u8; RECORD_LEN];
    let payload = buffer.get_mut(..length).ok_or(Error::StorageCorrupted)?;
    store.read(RECORD_OFFSET + HEADER_LEN, payload)?;
    if compute_crc(payload) != crc_stored {
        #[cfg(feature = "defmt")]
        defmt::warn!("Configuration record CRC mismatch");
        return Err(Error::StorageCorrupted);
    }

    let mut config = DisplayConfig::default();
    let mut offset = 0;
    for slot in FIELDS.iter().filter(|slot| slot.since <= version) {
        let source = payload
            .get(offset..offset + slot.len)
            .ok_or(Error::StorageCorrupted)?;
        decode_field(&mut config, slot.field, source)?;
        offset += slot.len;
    }

    #[cfg(feature = "defmt")]
    defmt::info!("Loaded configuration record v{}", version);
    let ring_len = u8::try_from(AMBILIGHT_LED_COUNT).unwrap_or(u8::MAX);
    Ok(Some(config.sanitized(ring_len)))
}

/// Write `config` as a current-version record.
///
/// # Errors
///
/// Returns [`Error::StorageUnavailable`] if the store is down and propagates encode and store
/// errors.
pub fn save(store: &mut impl ConfigStore, config: &DisplayConfig) -> Result<()> {
    if !store.is_up() {
        return Err(Error::StorageUnavailable);
    }
    let mut buffer = [0u8; RECORD_LEN];
    let len = encode_record(config, CURRENT_VERSION, &mut buffer)?;
    store.write(RECORD_OFFSET, &buffer[..len])?;
    #[cfg(feature = "defmt")]
    defmt::info!("Saved configuration record v{}", CURRENT_VERSION);
    Ok(())
}

fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}
