//! Scrolling text across the letter matrix.
//!
//! Glyphs come from the `embedded-graphics` 6x10 ISO-8859-1 mono font, rasterized into column
//! bitmasks through a tiny [`DrawTarget`]. Each step scrolls the face one column to the left;
//! a character takes [`TICKER_COLS`] glyph columns plus one blank spacing column. After the last
//! character the face keeps scrolling until the text has left it.

use core::convert::Infallible;
use core::fmt::Write;

use embedded_graphics::{
    Drawable, Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{MonoTextStyle, iso_8859_1::FONT_6X10},
    pixelcolor::BinaryColor,
    text::{Baseline, Text},
};
use heapless::{String, Vec};
use time::PrimitiveDateTime;

use crate::animation::Canvas;
use crate::led_plane::{Plane, WC_COLUMNS, WC_ROWS};
use crate::{Error, Result};

/// Glyph width in columns.
pub const TICKER_COLS: usize = 6;
/// Glyph height in rows.
pub const TICKER_ROWS: usize = 10;
/// Characters the ticker buffer holds.
pub const TICKER_CAPACITY: usize = 64;

const _: () = assert!(TICKER_ROWS <= WC_ROWS);
const _: () = assert!(TICKER_ROWS <= u16::BITS as usize);

/// One glyph as column bitmasks; bit `r` is row `r`.
type GlyphColumns = [u16; TICKER_COLS];

#[derive(Default)]
struct GlyphCanvas {
    columns: GlyphColumns,
}

impl OriginDimensions for GlyphCanvas {
    fn size(&self) -> Size {
        Size::new(TICKER_COLS as u32, TICKER_ROWS as u32)
    }
}

impl DrawTarget for GlyphCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            let (Ok(col), Ok(row)) = (usize::try_from(coord.x), usize::try_from(coord.y)) else {
                continue;
            };
            if row >= TICKER_ROWS || !color.is_on() {
                continue;
            }
            if let Some(column) = self.columns.get_mut(col) {
                *column |= 1 << row;
            }
        }
        Ok(())
    }
}

fn rasterize(ch: char) -> GlyphColumns {
    let mut canvas = GlyphCanvas::default();
    let mut buffer = [0u8; 4];
    let text = ch.encode_utf8(&mut buffer);
    let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let Ok(_) = Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut canvas);
    canvas.columns
}

/// Outcome of one ticker tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerProgress {
    /// No text.
    Idle,
    /// Waiting for the next step (deceleration).
    Waiting,
    /// Scrolled one column.
    Scrolled,
    /// The text has left the face.
    Finished,
}

/// Scroll state of the ticker.
#[derive(Debug, Clone)]
pub struct Ticker {
    text: Vec<char, TICKER_CAPACITY>,
    /// Character being scrolled in.
    position: usize,
    /// Column of that character, `TICKER_COLS` is the spacing column.
    column: usize,
    glyph: GlyphColumns,
    /// Blank columns scrolled in after the text.
    trailing: usize,
    window: [u16; WC_COLUMNS],
    counter: u8,
    active: bool,
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: Vec::new(),
            position: 0,
            column: 0,
            glyph: [0; TICKER_COLS],
            trailing: 0,
            window: [0; WC_COLUMNS],
            counter: 0,
            active: false,
        }
    }

    /// Replace the ticker text and restart scrolling from a blank face.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TickerTooLong`] if `text` has more than [`TICKER_CAPACITY`] characters;
    /// the previous text keeps running.
    pub fn set_text(&mut self, text: &str) -> Result<()> {
        let mut chars = Vec::new();
        for ch in text.chars() {
            chars.push(ch).map_err(|_| Error::TickerTooLong)?;
        }
        self.text = chars;
        self.position = 0;
        self.column = 0;
        self.trailing = 0;
        self.window = [0; WC_COLUMNS];
        self.counter = 0;
        self.active = !self.text.is_empty();
        if let Some(&first) = self.text.first() {
            self.glyph = rasterize(first);
        }
        Ok(())
    }

    /// Stop scrolling immediately.
    pub fn clear(&mut self) {
        self.text.clear();
        self.active = false;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Index of the character being scrolled in, `None` once the text is exhausted.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        (self.active && self.position < self.text.len()).then_some(self.position)
    }

    /// The character being scrolled in.
    #[must_use]
    pub fn current_char(&self) -> Option<char> {
        self.text.get(self.position().unwrap_or(usize::MAX)).copied()
    }

    fn next_column(&mut self) -> u16 {
        if self.position >= self.text.len() {
            self.trailing += 1;
            return 0;
        }
        let bits = self.glyph.get(self.column).copied().unwrap_or(0);
        self.column += 1;
        if self.column > TICKER_COLS {
            self.column = 0;
            self.position += 1;
            if let Some(&next) = self.text.get(self.position) {
                self.glyph = rasterize(next);
            }
        }
        bits
    }

    /// Advance one 64 Hz tick, scrolling every `deceleration` ticks. Draws into `New` and the
    /// frame. On [`TickerProgress::Finished`] the caller owns the (blank) face again.
    pub fn tick(&mut self, canvas: &mut Canvas, deceleration: u8) -> TickerProgress {
        if !self.active {
            return TickerProgress::Idle;
        }
        self.counter = self.counter.saturating_add(1);
        if self.counter < deceleration {
            return TickerProgress::Waiting;
        }
        self.counter = 0;

        let incoming = self.next_column();
        self.window.copy_within(1.., 0);
        if let Some(last) = self.window.last_mut() {
            *last = incoming;
        }
        if self.trailing >= WC_COLUMNS {
            self.active = false;
        }

        for (col, bits) in self.window.iter().enumerate() {
            for row in 0..WC_ROWS {
                canvas.plane.set(row, col, Plane::New, bits & (1 << row) != 0);
            }
        }
        canvas.frame.paint(&canvas.plane, Plane::New, canvas.on);
        if self.active {
            TickerProgress::Scrolled
        } else {
            TickerProgress::Finished
        }
    }
}

/// Expand a date-ticker format: `%d` day, `%m` month, `%y` two-digit year, `%Y` year, `%H` hour,
/// `%M` minute, `%%` a percent sign. Other characters are copied.
///
/// # Errors
///
/// Returns [`Error::TickerTooLong`] if the expansion does not fit the ticker buffer.
pub fn format_date(format: &str, date: &PrimitiveDateTime) -> Result<String<TICKER_CAPACITY>> {
    let mut out = String::new();
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        let written = if ch == '%' {
            match chars.next() {
                Some('d') => write!(out, "{:02}", date.day()),
                Some('m') => write!(out, "{:02}", u8::from(date.month())),
                Some('y') => write!(out, "{:02}", date.year().rem_euclid(100)),
                Some('Y') => write!(out, "{}", date.year()),
                Some('H') => write!(out, "{:02}", date.hour()),
                Some('M') => write!(out, "{:02}", date.minute()),
                Some('%') => out.push('%').map_err(|()| core::fmt::Error),
                Some(other) => out
                    .push('%')
                    .and_then(|()| out.push(other))
                    .map_err(|()| core::fmt::Error),
                None => out.push('%').map_err(|()| core::fmt::Error),
            }
        } else {
            out.push(ch).map_err(|()| core::fmt::Error)
        };
        written.map_err(|_| Error::TickerTooLong)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn glyphs_have_ink_and_space_has_none() {
        assert!(rasterize('A').iter().any(|&column| column != 0));
        assert!(rasterize(' ').iter().all(|&column| column == 0));
        assert!(rasterize('Ü').iter().any(|&column| column != 0));
    }

    #[test]
    fn overlong_text_is_rejected() {
        let mut ticker = Ticker::new();
        let long: String<80> = core::iter::repeat_n('x', TICKER_CAPACITY + 1).collect();
        assert_eq!(ticker.set_text(&long), Err(Error::TickerTooLong));
        assert!(!ticker.is_active());
    }

    #[test]
    fn date_format_expands() {
        let date = datetime!(2024-03-07 09:05);
        let text = format_date("%d.%m.%Y %H:%M %y%%", &date).expect("fits");
        assert_eq!(text.as_str(), "07.03.2024 09:05 24%");
    }
}
