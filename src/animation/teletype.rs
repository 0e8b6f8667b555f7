use super::{Canvas, Progress};
use crate::led_plane::Plane;

/// Blank the face, then type the new layout letter by letter, one every other step.
#[derive(Debug, Clone)]
pub struct Teletype {
    cursor: Option<usize>,
    idle_step: bool,
}

impl Teletype {
    pub const fn new() -> Self {
        Self {
            cursor: None,
            idle_step: false,
        }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        let Some(cursor) = self.cursor else {
            canvas.plane.fill(Plane::New, false);
            canvas.frame.paint(&canvas.plane, Plane::New, canvas.on);
            self.cursor = Some(0);
            return Progress::Running;
        };

        self.idle_step = !self.idle_step;
        if self.idle_step {
            return Progress::Running;
        }
        match canvas.plane.next_set(cursor, Plane::Target) {
            Some(index) => {
                canvas.plane.set_index(index, Plane::New, true);
                if let Some(pixel) = canvas.frame.get_mut(index) {
                    *pixel = canvas.on;
                }
                self.cursor = Some(index + 1);
                Progress::Running
            }
            None => canvas.finish(),
        }
    }
}
