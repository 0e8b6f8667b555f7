use heapless::Deque;

use super::{Canvas, Progress};
use crate::color::LedColor;
use crate::led_plane::{DISPLAY_LED_COUNT, LedPlane, Plane, WC_COLUMNS};

const SNAKE_LENGTH: usize = WC_COLUMNS - 5;

/// A short snake crawls the face row by row (odd rows right-to-left), visiting only cells that
/// are lit before or after the transition. Cells behind its tail show the new layout.
#[derive(Debug, Clone)]
pub struct Snake {
    /// Sweep positions of the body, tail first.
    body: Deque<usize, SNAKE_LENGTH>,
    head: Option<usize>,
    exhausted: bool,
}

impl Snake {
    /// Starts with no cell passed yet.
    pub fn new(canvas: &mut Canvas) -> Self {
        canvas.plane.fill(Plane::Calc, false);
        Self {
            body: Deque::new(),
            head: None,
            exhausted: false,
        }
    }

    fn pass(canvas: &mut Canvas, sweep: usize) {
        canvas
            .plane
            .set_index(LedPlane::snake_index(sweep), Plane::Calc, true);
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        if !self.exhausted {
            match canvas.plane.next_lit_in_sweep(self.head) {
                Some(next) => {
                    if self.body.is_full() {
                        if let Some(tail) = self.body.pop_front() {
                            Self::pass(canvas, tail);
                        }
                    }
                    if self.body.push_back(next).is_ok() {
                        self.head = Some(next);
                    } else {
                        self.exhausted = true;
                    }
                }
                None => self.exhausted = true,
            }
        }
        if self.exhausted {
            match self.body.pop_front() {
                Some(tail) => Self::pass(canvas, tail),
                None => return canvas.finish(),
            }
        }

        let color = canvas.dimmed(LedColor::GREEN);
        for index in 0..DISPLAY_LED_COUNT {
            let cell = canvas.plane.cell_at(index);
            let shown = if cell.get(Plane::Calc) {
                if cell.get(Plane::Target) { canvas.on } else { LedColor::OFF }
            } else if cell.get(Plane::Current) {
                canvas.previous
            } else {
                LedColor::OFF
            };
            if let Some(pixel) = canvas.frame.get_mut(index) {
                *pixel = shown;
            }
        }
        for &sweep in &self.body {
            if let Some(pixel) = canvas.frame.get_mut(LedPlane::snake_index(sweep)) {
                *pixel = color;
            }
        }
        Progress::Running
    }
}
