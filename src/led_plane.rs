//! Per-LED bit-planes of the letter matrix plus the color frame that is flushed to the strip.
//!
//! Every matrix cell carries four independent flags:
//!
//! - [`Plane::Current`]: lit right now,
//! - [`Plane::Target`]: lit once the pending transition finishes,
//! - [`Plane::New`]: working bit for animations,
//! - [`Plane::Calc`]: scratch bit for multi-pass animations.
//!
//! Only the clock, ticker and icon render paths write `Target`; animations read it and leave
//! `Current == Target` when they finish.

use core::ops::{Deref, DerefMut};

use itertools::iproduct;

use crate::color::LedColor;
use crate::led_layout::LedLayout;

/// Rows of the letter matrix.
pub const WC_ROWS: usize = 10;
/// Columns of the letter matrix.
pub const WC_COLUMNS: usize = 11;
/// LEDs behind the letter matrix.
pub const DISPLAY_LED_COUNT: usize = WC_ROWS * WC_COLUMNS;

/// Status LED(s) in front of the minute LEDs.
pub const STATUS_LED_COUNT: usize = 1;
/// Corner LEDs for the minutes between two five-minute words.
pub const MINUTE_LED_COUNT: usize = 4;
/// LEDs of the ambilight ring.
pub const AMBILIGHT_LED_COUNT: usize = 60;

/// Strip zones, concatenated as status, minute, display, ambilight.
pub const STATUS_LED_OFFSET: usize = 0;
pub const MINUTE_LED_OFFSET: usize = STATUS_LED_OFFSET + STATUS_LED_COUNT;
pub const DISPLAY_LED_OFFSET: usize = MINUTE_LED_OFFSET + MINUTE_LED_COUNT;
pub const AMBILIGHT_LED_OFFSET: usize = DISPLAY_LED_OFFSET + DISPLAY_LED_COUNT;
/// LEDs on the whole strip.
pub const TOTAL_LED_COUNT: usize = AMBILIGHT_LED_OFFSET + AMBILIGHT_LED_COUNT;

/// Physical wiring of the face.
pub const DISPLAY_LAYOUT: LedLayout<DISPLAY_LED_COUNT, WC_COLUMNS, WC_ROWS> =
    LedLayout::serpentine_row_major();

/// One of the four flags of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    Current,
    Target,
    New,
    Calc,
}

impl Plane {
    const fn mask(self) -> u8 {
        match self {
            Self::Current => 0x01,
            Self::Target => 0x02,
            Self::New => 0x04,
            Self::Calc => 0x08,
        }
    }
}

/// The four flags of one cell, packed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedState(u8);

impl LedState {
    #[must_use]
    pub const fn get(self, plane: Plane) -> bool {
        self.0 & plane.mask() != 0
    }

    pub const fn set(&mut self, plane: Plane, on: bool) {
        if on {
            self.0 |= plane.mask();
        } else {
            self.0 &= !plane.mask();
        }
    }

    #[must_use]
    pub const fn current(self) -> bool {
        self.get(Plane::Current)
    }

    #[must_use]
    pub const fn target(self) -> bool {
        self.get(Plane::Target)
    }
}

/// Bit-planes of the whole matrix, addressed by `(row, col)` or by flat `row * WC_COLUMNS + col`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedPlane {
    cells: [LedState; DISPLAY_LED_COUNT],
}

impl Default for LedPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPlane {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [LedState(0); DISPLAY_LED_COUNT],
        }
    }

    /// Flat index of `(row, col)`.
    #[must_use]
    pub const fn index(row: usize, col: usize) -> usize {
        row * WC_COLUMNS + col
    }

    /// `(row, col)` of a flat index.
    #[must_use]
    pub const fn row_col(index: usize) -> (usize, usize) {
        (index / WC_COLUMNS, index % WC_COLUMNS)
    }

    /// Flags of one cell; out-of-range cells read as all clear.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> LedState {
        if row >= WC_ROWS || col >= WC_COLUMNS {
            return LedState::default();
        }
        self.cells
            .get(Self::index(row, col))
            .copied()
            .unwrap_or_default()
    }

    /// Flags of the cell at flat `index`.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> LedState {
        self.cells.get(index).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize, plane: Plane) -> bool {
        self.cell(row, col).get(plane)
    }

    /// Set one flag; out-of-range cells are ignored.
    pub fn set(&mut self, row: usize, col: usize, plane: Plane, on: bool) {
        if row >= WC_ROWS || col >= WC_COLUMNS {
            return;
        }
        if let Some(cell) = self.cells.get_mut(Self::index(row, col)) {
            cell.set(plane, on);
        }
    }

    #[must_use]
    pub fn get_index(&self, index: usize, plane: Plane) -> bool {
        self.cells.get(index).is_some_and(|cell| cell.get(plane))
    }

    pub fn set_index(&mut self, index: usize, plane: Plane, on: bool) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.set(plane, on);
        }
    }

    /// Set `plane` of every cell.
    pub fn fill(&mut self, plane: Plane, on: bool) {
        self.cells.iter_mut().for_each(|cell| cell.set(plane, on));
    }

    /// Copy `from` into `to` for every cell.
    pub fn copy(&mut self, from: Plane, to: Plane) {
        self.cells.iter_mut().for_each(|cell| {
            let on = cell.get(from);
            cell.set(to, on);
        });
    }

    /// Finish a transition: `Current := Target`, working bits cleared.
    pub fn commit_target(&mut self) {
        self.copy(Plane::Target, Plane::Current);
        self.fill(Plane::New, false);
        self.fill(Plane::Calc, false);
    }

    /// Whether two planes hold the same pattern.
    #[must_use]
    pub fn planes_equal(&self, first: Plane, second: Plane) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.get(first) == cell.get(second))
    }

    /// Number of cells with `plane` set.
    #[must_use]
    pub fn count(&self, plane: Plane) -> usize {
        self.cells.iter().filter(|cell| cell.get(plane)).count()
    }

    /// Whether any cell has `plane` set.
    #[must_use]
    pub fn any(&self, plane: Plane) -> bool {
        self.cells.iter().any(|cell| cell.get(plane))
    }

    /// Every `(row, col)` in row-major order.
    pub fn positions() -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0..WC_ROWS, 0..WC_COLUMNS)
    }

    /// Flat index of the `step`-th cell of a boustrophedon sweep (odd rows right-to-left).
    #[must_use]
    pub const fn snake_index(step: usize) -> usize {
        let (row, offset) = Self::row_col(step);
        let col = if row % 2 == 0 {
            offset
        } else {
            WC_COLUMNS - 1 - offset
        };
        Self::index(row, col)
    }

    /// Next sweep position after `from` (or the first one if `None`) whose cell is lit in
    /// `Current` or `Target`.
    #[must_use]
    pub fn next_lit_in_sweep(&self, from: Option<usize>) -> Option<usize> {
        let start = from.map_or(0, |step| step + 1);
        (start..DISPLAY_LED_COUNT).find(|&step| {
            let index = Self::snake_index(step);
            self.get_index(index, Plane::Current) || self.get_index(index, Plane::Target)
        })
    }

    /// Next flat index at or after `from` whose `plane` is set.
    #[must_use]
    pub fn next_set(&self, from: usize, plane: Plane) -> Option<usize> {
        (from..DISPLAY_LED_COUNT).find(|&index| self.get_index(index, plane))
    }
}

/// Logical colors of the matrix, indexed like [`LedPlane`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(pub [LedColor; DISPLAY_LED_COUNT]);

impl Frame {
    #[must_use]
    pub const fn new() -> Self {
        Self([LedColor::OFF; DISPLAY_LED_COUNT])
    }

    pub fn set(&mut self, row: usize, col: usize, color: LedColor) {
        if row >= WC_ROWS || col >= WC_COLUMNS {
            return;
        }
        if let Some(cell) = self.0.get_mut(LedPlane::index(row, col)) {
            *cell = color;
        }
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> LedColor {
        if row >= WC_ROWS || col >= WC_COLUMNS {
            return LedColor::OFF;
        }
        self.0
            .get(LedPlane::index(row, col))
            .copied()
            .unwrap_or_default()
    }

    /// Paint every cell `on` where `plane` is set, off elsewhere.
    pub fn paint(&mut self, plane: &LedPlane, which: Plane, on: LedColor) {
        for (index, color) in self.0.iter_mut().enumerate() {
            *color = if plane.get_index(index, which) {
                on
            } else {
                LedColor::OFF
            };
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Frame {
    type Target = [LedColor; DISPLAY_LED_COUNT];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Frame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
