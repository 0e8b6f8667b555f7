use super::{Canvas, Progress};
use crate::led_plane::{DISPLAY_LED_COUNT, Plane};

const FLICKER_STEPS: u8 = 32;

/// Strobe the old and new letters together, mostly on, then settle on the new layout.
#[derive(Debug, Clone)]
pub struct Flicker {
    step: u8,
}

impl Flicker {
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        self.step += 1;
        if self.step >= FLICKER_STEPS {
            return canvas.finish();
        }

        let visible = canvas.random(8) < 7;
        for index in 0..DISPLAY_LED_COUNT {
            let union = visible
                && (canvas.plane.get_index(index, Plane::Current)
                    || canvas.plane.get_index(index, Plane::Target));
            canvas.plane.set_index(index, Plane::New, union);
        }
        canvas.frame.paint(&canvas.plane, Plane::New, canvas.on);
        Progress::Running
    }
}
