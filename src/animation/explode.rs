use super::{Canvas, Progress};
use crate::color::LedColor;
use crate::led_plane::{LedPlane, Plane, WC_COLUMNS, WC_ROWS};

const STEPS: usize = WC_COLUMNS / 2;

const TOP_LAST_ROW: usize = WC_ROWS / 2 - 1;
const BOTTOM_FIRST_ROW: usize = WC_ROWS / 2;
const LEFT_LAST_COL: usize = WC_COLUMNS / 2 - 1;
const RIGHT_FIRST_COL: usize = (WC_COLUMNS + 1) / 2;

/// Old cells fly outward from the center while the new layout condenses out of the center.
///
/// `New` holds the exploding old cells, `Calc` the imploded new cells of the current step.
#[derive(Debug, Clone)]
pub struct Explode {
    step: usize,
}

/// Move `row` `distance` cells toward the center line, never crossing it.
const fn implode_row(row: usize, distance: usize) -> usize {
    if row <= TOP_LAST_ROW {
        let moved = row + distance;
        if moved > TOP_LAST_ROW { TOP_LAST_ROW } else { moved }
    } else {
        let moved = row.saturating_sub(distance);
        if moved < BOTTOM_FIRST_ROW { BOTTOM_FIRST_ROW } else { moved }
    }
}

const fn implode_col(col: usize, distance: usize) -> usize {
    if col <= LEFT_LAST_COL {
        let moved = col + distance;
        if moved > LEFT_LAST_COL { LEFT_LAST_COL } else { moved }
    } else if col >= RIGHT_FIRST_COL {
        let moved = col.saturating_sub(distance);
        if moved < RIGHT_FIRST_COL { RIGHT_FIRST_COL } else { moved }
    } else {
        col
    }
}

/// Move `(row, col)` `distance` cells away from the center; `None` once it leaves the face.
const fn explode(row: usize, col: usize, distance: usize) -> Option<(usize, usize)> {
    let row = if row <= TOP_LAST_ROW {
        match row.checked_sub(distance) {
            Some(row) => row,
            None => return None,
        }
    } else {
        row + distance
    };
    let col = if col <= LEFT_LAST_COL {
        match col.checked_sub(distance) {
            Some(col) => col,
            None => return None,
        }
    } else if col >= RIGHT_FIRST_COL {
        col + distance
    } else {
        col
    };
    if row < WC_ROWS && col < WC_COLUMNS {
        Some((row, col))
    } else {
        None
    }
}

impl Explode {
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        self.step += 1;
        if self.step >= STEPS {
            return canvas.finish();
        }

        canvas.plane.fill(Plane::New, false);
        canvas.plane.fill(Plane::Calc, false);
        let distance = STEPS - self.step;
        for (row, col) in LedPlane::positions() {
            if canvas.plane.get(row, col, Plane::Current) {
                if let Some((out_row, out_col)) = explode(row, col, self.step) {
                    canvas.plane.set(out_row, out_col, Plane::New, true);
                }
            }
            if canvas.plane.get(row, col, Plane::Target) {
                canvas.plane.set(
                    implode_row(row, distance),
                    implode_col(col, distance),
                    Plane::Calc,
                    true,
                );
            }
        }

        for (row, col) in LedPlane::positions() {
            let cell = canvas.plane.cell(row, col);
            let color = if cell.get(Plane::Calc) {
                canvas.on
            } else if cell.get(Plane::New) {
                canvas.previous
            } else {
                LedColor::OFF
            };
            canvas.frame.set(row, col, color);
        }
        Progress::Running
    }
}
