use super::{Canvas, Progress};
use crate::color::LedColor;
use crate::led_plane::{DISPLAY_LED_COUNT, Plane};

const FADE_STEPS: u8 = 20;

/// Cross-fade: leaving cells ramp down, arriving cells ramp up, staying cells blend from the
/// old to the new color.
#[derive(Debug, Clone)]
pub struct Fade {
    step: u8,
}

impl Fade {
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        self.step += 1;
        if self.step >= FADE_STEPS {
            return canvas.finish();
        }

        for index in 0..DISPLAY_LED_COUNT {
            let current = canvas.plane.get_index(index, Plane::Current);
            let target = canvas.plane.get_index(index, Plane::Target);
            let color = match (current, target) {
                (true, true) => canvas.previous.lerp(canvas.on, self.step, FADE_STEPS),
                (true, false) => canvas.previous.lerp(LedColor::OFF, self.step, FADE_STEPS),
                (false, true) => LedColor::OFF.lerp(canvas.on, self.step, FADE_STEPS),
                (false, false) => LedColor::OFF,
            };
            if let Some(cell) = canvas.frame.get_mut(index) {
                *cell = color;
            }
        }
        Progress::Running
    }
}
