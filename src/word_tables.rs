//! Which words light up for a given time, and where each word sits on the face.
//!
//! The engine only talks to the [`WordTables`] trait. [`GermanWordTables`] is the built-in German
//! 10x11 face with two regional phrasings.

use crate::led_plane::{WC_COLUMNS, WC_ROWS};

/// Upper bound on word indices a table may use.
pub const MAX_WORDS: usize = 32;

/// Activation flag per word index.
pub type WordSet = [bool; MAX_WORDS];

/// Horizontal run of letters on the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordRect {
    pub row: u8,
    pub col: u8,
    pub len: u8,
}

impl WordRect {
    const fn new(row: u8, col: u8, len: u8) -> Self {
        Self { row, col, len }
    }

    /// `(row, col)` of every letter, clipped to the face.
    pub fn cells(self) -> impl Iterator<Item = (usize, usize)> {
        let row = usize::from(self.row);
        let start = usize::from(self.col);
        let end = (start + usize::from(self.len)).min(WC_COLUMNS);
        (start..end)
            .filter(move |_| row < WC_ROWS)
            .map(move |col| (row, col))
    }
}

/// Word-layout lookup consumed by the display engine.
pub trait WordTables {
    /// Select display mode `mode`; loading may finish later, see [`WordTables::complete`].
    fn load(&mut self, mode: u8);

    /// Whether the tables for the selected mode are ready.
    fn complete(&self) -> bool;

    /// Number of selectable display modes.
    fn mode_count(&self) -> u8;

    /// Mark the words for `hour:minute`. Returns `false` when the tables are not ready.
    fn fill_words(&self, words: &mut WordSet, hour: u8, minute: u8, show_it_is: bool) -> bool;

    /// Letters of word `index`.
    fn word_rect(&self, index: usize) -> Option<WordRect>;
}

const ES: usize = 0;
const IST: usize = 1;
const FUENF: usize = 2;
const ZEHN: usize = 3;
const ZWANZIG: usize = 4;
const DREIVIERTEL: usize = 5;
const VIERTEL: usize = 6;
const VOR: usize = 7;
const NACH: usize = 8;
const HALB: usize = 9;
const UHR: usize = 10;
/// "EIN" as used in "ein Uhr".
const EIN: usize = 11;
/// First hour word; `HOUR_BASE + h - 1` is hour `h` in `1..=12`.
const HOUR_BASE: usize = 12;

const WORD_COUNT: usize = HOUR_BASE + 12;

#[rustfmt::skip]
const GERMAN_WORDS: [WordRect; WORD_COUNT] = [
    WordRect::new(0, 0, 2),  // ES
    WordRect::new(0, 3, 3),  // IST
    WordRect::new(0, 7, 4),  // FÜNF
    WordRect::new(1, 0, 4),  // ZEHN
    WordRect::new(1, 4, 7),  // ZWANZIG
    WordRect::new(2, 0, 11), // DREIVIERTEL
    WordRect::new(2, 4, 7),  // VIERTEL
    WordRect::new(3, 0, 3),  // VOR
    WordRect::new(3, 7, 4),  // NACH
    WordRect::new(4, 0, 4),  // HALB
    WordRect::new(9, 8, 3),  // UHR
    WordRect::new(5, 0, 3),  // EIN
    WordRect::new(5, 0, 4),  // EINS
    WordRect::new(5, 7, 4),  // ZWEI
    WordRect::new(6, 0, 4),  // DREI
    WordRect::new(6, 7, 4),  // VIER
    WordRect::new(4, 7, 4),  // FÜNF
    WordRect::new(7, 0, 5),  // SECHS
    WordRect::new(8, 0, 6),  // SIEBEN
    WordRect::new(7, 7, 4),  // ACHT
    WordRect::new(9, 3, 4),  // NEUN
    WordRect::new(9, 0, 4),  // ZEHN
    WordRect::new(5, 5, 3),  // ELF
    WordRect::new(8, 6, 5),  // ZWÖLF
];

/// Regional phrasing of the German face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GermanMode {
    /// "viertel nach drei", "viertel vor vier".
    #[default]
    Wessi,
    /// "viertel vier", "dreiviertel vier", "zehn vor halb".
    Ossi,
}

impl GermanMode {
    const fn from_u8(mode: u8) -> Self {
        match mode {
            1 => Self::Ossi,
            _ => Self::Wessi,
        }
    }
}

/// Built-in German word tables. Loading is immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GermanWordTables {
    mode: GermanMode,
    loaded: bool,
}

impl Default for GermanWordTables {
    fn default() -> Self {
        Self::new()
    }
}

impl GermanWordTables {
    /// Tables already loaded in [`GermanMode::Wessi`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: GermanMode::Wessi,
            loaded: true,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> GermanMode {
        self.mode
    }

    /// Words before the hour for minute slot `slot` (`0..12`) and whether the next hour is named.
    const fn phrase(&self, slot: u8) -> (&'static [usize], bool) {
        let ossi = matches!(self.mode, GermanMode::Ossi);
        match slot {
            0 => (&[UHR], false),
            1 => (&[FUENF, NACH], false),
            2 => (&[ZEHN, NACH], false),
            3 if ossi => (&[VIERTEL], true),
            3 => (&[VIERTEL, NACH], false),
            4 if ossi => (&[ZEHN, VOR, HALB], true),
            4 => (&[ZWANZIG, NACH], false),
            5 => (&[FUENF, VOR, HALB], true),
            6 => (&[HALB], true),
            7 => (&[FUENF, NACH, HALB], true),
            8 if ossi => (&[ZEHN, NACH, HALB], true),
            8 => (&[ZWANZIG, VOR], true),
            9 if ossi => (&[DREIVIERTEL], true),
            9 => (&[VIERTEL, VOR], true),
            10 => (&[ZEHN, VOR], true),
            _ => (&[FUENF, VOR], true),
        }
    }
}

impl WordTables for GermanWordTables {
    fn load(&mut self, mode: u8) {
        self.mode = GermanMode::from_u8(mode);
        self.loaded = true;
    }

    fn complete(&self) -> bool {
        self.loaded
    }

    fn mode_count(&self) -> u8 {
        2
    }

    fn fill_words(&self, words: &mut WordSet, hour: u8, minute: u8, show_it_is: bool) -> bool {
        if !self.loaded {
            return false;
        }
        words.fill(false);

        let slot = (minute % 60) / 5;
        let (phrase, next_hour) = self.phrase(slot);
        for &word in phrase {
            words[word] = true;
        }

        let hour = (hour % 12 + u8::from(next_hour)) % 12;
        let hour = if hour == 0 { 12 } else { hour };
        if hour == 1 && slot == 0 {
            words[EIN] = true;
        } else {
            words[HOUR_BASE + usize::from(hour) - 1] = true;
        }

        if show_it_is {
            words[ES] = true;
            words[IST] = true;
        }
        true
    }

    fn word_rect(&self, index: usize) -> Option<WordRect> {
        GERMAN_WORDS.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(tables: &GermanWordTables, hour: u8, minute: u8) -> heapless::Vec<usize, MAX_WORDS> {
        let mut words = [false; MAX_WORDS];
        assert!(tables.fill_words(&mut words, hour, minute, false));
        words
            .iter()
            .enumerate()
            .filter_map(|(index, on)| on.then_some(index))
            .collect()
    }

    #[test]
    fn full_hour_uses_ein_uhr() {
        let tables = GermanWordTables::new();
        assert_eq!(lit(&tables, 13, 2).as_slice(), &[UHR, EIN]);
        assert_eq!(lit(&tables, 0, 0).as_slice(), &[UHR, HOUR_BASE + 11]);
    }

    #[test]
    fn quarter_past_differs_by_region() {
        let mut tables = GermanWordTables::new();
        assert_eq!(lit(&tables, 3, 15).as_slice(), &[VIERTEL, NACH, HOUR_BASE + 2]);
        tables.load(1);
        assert_eq!(lit(&tables, 3, 15).as_slice(), &[VIERTEL, HOUR_BASE + 3]);
        assert_eq!(lit(&tables, 3, 47).as_slice(), &[DREIVIERTEL, HOUR_BASE + 3]);
    }

    #[test]
    fn half_names_the_next_hour() {
        let tables = GermanWordTables::new();
        assert_eq!(lit(&tables, 11, 30).as_slice(), &[HALB, HOUR_BASE + 11]);
    }

    #[test]
    fn every_word_fits_the_face() {
        for rect in GERMAN_WORDS {
            assert!(usize::from(rect.row) < WC_ROWS);
            assert!(usize::from(rect.col) + usize::from(rect.len) <= WC_COLUMNS);
        }
    }
}
