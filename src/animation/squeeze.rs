use super::{Canvas, Progress};
use crate::color::LedColor;
use crate::led_plane::{LedPlane, Plane, WC_COLUMNS, WC_ROWS};

/// Letters are pushed against the right edge and squeezed out of it, then the new layout grows
/// in from the left, one column per step.
#[derive(Debug, Clone)]
pub struct Squeeze {
    squeezing: bool,
    columns: usize,
}

impl Squeeze {
    pub fn new(canvas: &mut Canvas) -> Self {
        canvas.plane.copy(Plane::Current, Plane::New);
        Self {
            squeezing: canvas.plane.any(Plane::New),
            columns: 0,
        }
    }

    /// Drop the rightmost cell of every row, then move each cell right into a free neighbour.
    fn squeeze(plane: &mut LedPlane) {
        for row in 0..WC_ROWS {
            plane.set(row, WC_COLUMNS - 1, Plane::New, false);
            for col in (0..WC_COLUMNS - 1).rev() {
                if plane.get(row, col, Plane::New) && !plane.get(row, col + 1, Plane::New) {
                    plane.set(row, col, Plane::New, false);
                    plane.set(row, col + 1, Plane::New, true);
                }
            }
        }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        if self.squeezing {
            Self::squeeze(&mut canvas.plane);
            self.squeezing = canvas.plane.any(Plane::New);
            canvas.frame.paint(&canvas.plane, Plane::New, canvas.previous);
            return Progress::Running;
        }

        self.columns += 1;
        if self.columns >= WC_COLUMNS {
            return canvas.finish();
        }
        for (row, col) in LedPlane::positions() {
            let color = if col < self.columns && canvas.plane.get(row, col, Plane::Target) {
                canvas.on
            } else {
                LedColor::OFF
            };
            canvas.frame.set(row, col, color);
        }
        Progress::Running
    }
}
