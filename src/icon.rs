//! Bitmap icons that fade in cell by cell, stay for a while and fade out again.

use crate::animation::Canvas;
use crate::color::LedColor;
use crate::display::DISPLAY_TICK_HZ;
use crate::led_plane::{DISPLAY_LED_COUNT, LedPlane, Plane, WC_COLUMNS, WC_ROWS};
use crate::{Error, Result};

/// Colors an icon can reference.
pub const ICON_PALETTE_LEN: usize = 16;
/// Ticks a cell takes to fade fully in or out.
pub const ICON_FADE_STEPS: u8 = 8;

/// One icon pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IconCell {
    /// Palette index; a cell whose palette color is off stays dark.
    pub color: u8,
    /// Tick of the fade-in phase at which this cell starts to fade in.
    pub on_step: u8,
    /// Tick of the fade-out phase at which this cell starts to fade out.
    pub off_step: u8,
}

/// A `rows x cols` icon, centered on the face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    rows: usize,
    cols: usize,
    cells: [IconCell; DISPLAY_LED_COUNT],
    palette: [LedColor; ICON_PALETTE_LEN],
    duration_secs: u8,
}

impl Icon {
    /// An empty icon shown for `duration_secs` between fade-in and fade-out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IconTooLarge`] if the icon does not fit on the face.
    pub fn new(rows: usize, cols: usize, duration_secs: u8) -> Result<Self> {
        if rows > WC_ROWS || cols > WC_COLUMNS {
            return Err(Error::IconTooLarge);
        }
        Ok(Self {
            rows,
            cols,
            cells: [IconCell::default(); DISPLAY_LED_COUNT],
            palette: [LedColor::OFF; ICON_PALETTE_LEN],
            duration_secs,
        })
    }

    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] outside the icon or for a palette index past the
    /// palette.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: IconCell) -> Result<()> {
        if row >= self.rows || col >= self.cols || usize::from(cell.color) >= ICON_PALETTE_LEN {
            return Err(Error::IndexOutOfBounds);
        }
        let slot = self
            .cells
            .get_mut(row * self.cols + col)
            .ok_or(Error::IndexOutOfBounds)?;
        *slot = cell;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is past the palette.
    pub fn set_palette(&mut self, index: usize, color: LedColor) -> Result<()> {
        let slot = self.palette.get_mut(index).ok_or(Error::IndexOutOfBounds)?;
        *slot = color.clamped();
        Ok(())
    }

    fn cell(&self, row: usize, col: usize) -> IconCell {
        self.cells
            .get(row * self.cols + col)
            .copied()
            .unwrap_or_default()
    }

    fn color(&self, cell: IconCell) -> LedColor {
        self.palette
            .get(usize::from(cell.color))
            .copied()
            .unwrap_or(LedColor::OFF)
    }

    /// Icon cell at face position `(row, col)`, if the icon covers it.
    fn at(&self, row: usize, col: usize) -> Option<IconCell> {
        let top = (WC_ROWS - self.rows) / 2;
        let left = (WC_COLUMNS - self.cols) / 2;
        let (row, col) = (row.checked_sub(top)?, col.checked_sub(left)?);
        (row < self.rows && col < self.cols).then(|| self.cell(row, col))
    }

    fn fade_in_ticks(&self) -> u32 {
        let last = self.cells.iter().map(|cell| cell.on_step).max().unwrap_or(0);
        u32::from(last) + u32::from(ICON_FADE_STEPS)
    }

    fn fade_out_ticks(&self) -> u32 {
        let last = self.cells.iter().map(|cell| cell.off_step).max().unwrap_or(0);
        u32::from(last) + u32::from(ICON_FADE_STEPS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Clear,
    FadeIn,
    Hold,
    FadeOut,
}

/// Outcome of one icon tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconProgress {
    Idle,
    Drew,
    /// The icon has faded out; the face is blank.
    Finished,
}

/// Plays an [`Icon`]: clear, fade in, hold, fade out.
#[derive(Debug, Clone)]
pub struct IconPlayer {
    icon: Option<Icon>,
    phase: Phase,
    ticks: u32,
}

impl Default for IconPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl IconPlayer {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            icon: None,
            phase: Phase::Clear,
            ticks: 0,
        }
    }

    /// Start showing `icon`, replacing any icon on screen.
    pub fn show(&mut self, icon: Icon) {
        self.icon = Some(icon);
        self.phase = Phase::Clear;
        self.ticks = 0;
    }

    pub fn clear(&mut self) {
        self.icon = None;
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.icon.is_some()
    }

    /// Fade level (`0..=ICON_FADE_STEPS`) of a cell `since` ticks after its start step.
    fn level(ticks: u32, start: u8) -> u8 {
        let since = ticks.saturating_sub(u32::from(start));
        u8::try_from(since.min(u32::from(ICON_FADE_STEPS))).unwrap_or(ICON_FADE_STEPS)
    }

    fn draw(icon: &Icon, phase: Phase, ticks: u32, canvas: &mut Canvas) {
        for (row, col) in LedPlane::positions() {
            let color = icon.at(row, col).map_or(LedColor::OFF, |cell| {
                let level = match phase {
                    Phase::Clear => 0,
                    Phase::FadeIn => Self::level(ticks, cell.on_step),
                    Phase::Hold => ICON_FADE_STEPS,
                    Phase::FadeOut => ICON_FADE_STEPS - Self::level(ticks, cell.off_step),
                };
                LedColor::OFF.lerp(canvas.dimmed(icon.color(cell)), level, ICON_FADE_STEPS)
            });
            canvas
                .plane
                .set(row, col, Plane::New, !color.is_off());
            canvas.frame.set(row, col, color);
        }
    }

    /// Advance one 64 Hz tick.
    pub fn tick(&mut self, canvas: &mut Canvas) -> IconProgress {
        let Some(icon) = &self.icon else {
            return IconProgress::Idle;
        };

        self.ticks += 1;
        let (phase, ticks) = (self.phase, self.ticks);
        let next = match phase {
            Phase::Clear => Some(Phase::FadeIn),
            Phase::FadeIn if ticks >= icon.fade_in_ticks() => Some(Phase::Hold),
            Phase::Hold if ticks >= u32::from(icon.duration_secs) * DISPLAY_TICK_HZ => {
                Some(Phase::FadeOut)
            }
            Phase::FadeOut if ticks >= icon.fade_out_ticks() => None,
            _ => Some(phase),
        };
        Self::draw(icon, phase, ticks, canvas);

        match next {
            Some(next) => {
                if next != phase {
                    self.phase = next;
                    self.ticks = 0;
                }
                IconProgress::Drew
            }
            None => {
                self.icon = None;
                canvas.plane.fill(Plane::New, false);
                canvas.frame.paint(&canvas.plane, Plane::New, LedColor::OFF);
                IconProgress::Finished
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_icon_is_rejected() {
        assert_eq!(Icon::new(WC_ROWS + 1, 3, 1), Err(Error::IconTooLarge));
        assert!(Icon::new(WC_ROWS, WC_COLUMNS, 1).is_ok());
    }

    #[test]
    fn cells_are_bounds_checked() {
        let mut icon = Icon::new(2, 2, 1).expect("fits");
        assert_eq!(
            icon.set_cell(2, 0, IconCell::default()),
            Err(Error::IndexOutOfBounds)
        );
        let bad_color = IconCell {
            color: 16,
            ..IconCell::default()
        };
        assert_eq!(icon.set_cell(0, 0, bad_color), Err(Error::IndexOutOfBounds));
        assert_eq!(icon.set_palette(16, LedColor::RED), Err(Error::IndexOutOfBounds));
    }

    #[test]
    fn small_icon_is_centered() {
        let icon = Icon::new(2, 3, 1).expect("fits");
        assert!(icon.at(3, 3).is_none());
        assert!(icon.at(4, 4).is_some());
        assert!(icon.at(5, 6).is_some());
        assert!(icon.at(6, 6).is_none());
    }
}
