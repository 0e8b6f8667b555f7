use super::{Canvas, Progress};
use crate::color::LedColor;
use crate::led_plane::{LedPlane, Plane, WC_COLUMNS, WC_ROWS};

const RINGS: usize = if WC_ROWS < WC_COLUMNS { WC_ROWS } else { WC_COLUMNS } / 2;

/// A hollow square shrinks from the border to the center over the old layout, then grows back
/// out over the new one.
#[derive(Debug, Clone)]
pub struct Cube {
    step: usize,
}

/// Distance of `(row, col)` from the nearest border.
fn ring_of(row: usize, col: usize) -> usize {
    row.min(col)
        .min(WC_ROWS - 1 - row)
        .min(WC_COLUMNS - 1 - col)
}

impl Cube {
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        if self.step >= 2 * RINGS {
            return canvas.finish();
        }
        let (ring, base, base_color) = if self.step < RINGS {
            (self.step, Plane::Current, canvas.previous)
        } else {
            (2 * RINGS - 1 - self.step, Plane::Target, canvas.on)
        };
        self.step += 1;

        let frame_color = canvas.dimmed(LedColor::WHITE);
        for (row, col) in LedPlane::positions() {
            let color = if ring_of(row, col) == ring {
                frame_color
            } else if canvas.plane.get(row, col, base) {
                base_color
            } else {
                LedColor::OFF
            };
            canvas.frame.set(row, col, color);
        }
        Progress::Running
    }
}
