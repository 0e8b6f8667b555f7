use super::{Canvas, Progress};
use crate::led_plane::{LedPlane, Plane, WC_ROWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Leaving cells fall off the bottom.
    Out,
    /// Arriving cells fall into place.
    In,
}

/// Letters that go away drop out of the face; then the new letters drop in, each starting just
/// below the nearest letter above it.
#[derive(Debug, Clone)]
pub struct Falling {
    phase: Phase,
    step: usize,
}

impl Falling {
    pub fn new(canvas: &Canvas) -> Self {
        let leaving = LedPlane::positions().any(|(row, col)| {
            canvas.plane.get(row, col, Plane::Current) && !canvas.plane.get(row, col, Plane::Target)
        });
        Self {
            phase: if leaving { Phase::Out } else { Phase::In },
            step: 0,
        }
    }

    fn staying(canvas: &Canvas, row: usize, col: usize) -> bool {
        canvas.plane.get(row, col, Plane::Current) && canvas.plane.get(row, col, Plane::Target)
    }

    fn arriving(canvas: &Canvas, row: usize, col: usize) -> bool {
        !canvas.plane.get(row, col, Plane::Current) && canvas.plane.get(row, col, Plane::Target)
    }

    /// Row where the arriving cell `(row, col)` starts falling.
    fn start_row(canvas: &Canvas, row: usize, col: usize) -> usize {
        (0..row)
            .rev()
            .find(|&above| canvas.plane.get(above, col, Plane::Target))
            .map_or(0, |above| above + 1)
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        self.step += 1;
        if self.step >= WC_ROWS {
            match self.phase {
                Phase::Out => {
                    self.phase = Phase::In;
                    self.step = 0;
                }
                Phase::In => return canvas.finish(),
            }
        }

        canvas.plane.fill(Plane::New, false);
        for (row, col) in LedPlane::positions() {
            if Self::staying(canvas, row, col) {
                canvas.plane.set(row, col, Plane::New, true);
            }
        }
        for (row, col) in LedPlane::positions() {
            match self.phase {
                Phase::Out => {
                    let leaving = canvas.plane.get(row, col, Plane::Current)
                        && !canvas.plane.get(row, col, Plane::Target);
                    if leaving {
                        canvas.plane.set(row + self.step, col, Plane::New, true);
                    }
                }
                Phase::In => {
                    if Self::arriving(canvas, row, col) {
                        let falling_row = (Self::start_row(canvas, row, col) + self.step).min(row);
                        canvas.plane.set(falling_row, col, Plane::New, true);
                    }
                }
            }
        }

        let color = match self.phase {
            Phase::Out => canvas.previous,
            Phase::In => canvas.on,
        };
        canvas.frame.paint(&canvas.plane, Plane::New, color);
        Progress::Running
    }
}
