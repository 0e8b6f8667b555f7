use super::{Canvas, Progress};
use crate::color::LedColor;
use crate::led_plane::{LedPlane, Plane, WC_COLUMNS, WC_ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Scrolls the old layout out and the new one in from the opposite edge, one cell per step.
#[derive(Debug, Clone)]
pub struct Roll {
    direction: Direction,
    step: usize,
}

impl Roll {
    pub fn new(canvas: &mut Canvas) -> Self {
        let direction = match canvas.random(4) {
            0 => Direction::Left,
            1 => Direction::Right,
            2 => Direction::Up,
            _ => Direction::Down,
        };
        Self { direction, step: 0 }
    }

    const fn steps(&self) -> usize {
        match self.direction {
            Direction::Left | Direction::Right => WC_COLUMNS,
            Direction::Up | Direction::Down => WC_ROWS,
        }
    }

    /// Which plane and cell is visible at `(row, col)` after `self.step` shifts.
    const fn source(&self, row: usize, col: usize) -> (Plane, usize, usize) {
        let step = self.step;
        match self.direction {
            Direction::Left if col + step < WC_COLUMNS => (Plane::Current, row, col + step),
            Direction::Left => (Plane::Target, row, col + step - WC_COLUMNS),
            Direction::Right if col >= step => (Plane::Current, row, col - step),
            Direction::Right => (Plane::Target, row, col + WC_COLUMNS - step),
            Direction::Up if row + step < WC_ROWS => (Plane::Current, row + step, col),
            Direction::Up => (Plane::Target, row + step - WC_ROWS, col),
            Direction::Down if row >= step => (Plane::Current, row - step, col),
            Direction::Down => (Plane::Target, row + WC_ROWS - step, col),
        }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        self.step += 1;
        if self.step >= self.steps() {
            return canvas.finish();
        }

        for (row, col) in LedPlane::positions() {
            let (plane, source_row, source_col) = self.source(row, col);
            let lit = canvas.plane.get(source_row, source_col, plane);
            canvas.plane.set(row, col, Plane::New, lit);
            let color = match (lit, plane) {
                (false, _) => LedColor::OFF,
                (true, Plane::Current) => canvas.previous,
                (true, _) => canvas.on,
            };
            canvas.frame.set(row, col, color);
        }
        Progress::Running
    }
}
