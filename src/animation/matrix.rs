use super::{Canvas, Progress};
use crate::color::{LedColor, RAINBOW_PHASES, rainbow_color};
use crate::led_plane::{LedPlane, Plane, WC_COLUMNS, WC_ROWS};

/// Rows between the heads of the two drops of a column.
const DROP_SPACING: i16 = (WC_ROWS + WC_ROWS / 2) as i16;
/// Lit cells behind a head, head included.
const TRAIL: i16 = 6;
/// A cell shows the new layout once the first head is this far below it.
const REVEAL_DISTANCE: i16 = 5;
const LAST_ROW: i16 = WC_ROWS as i16 - 1;
/// Largest random start delay of a column.
const MAX_DELAY: u32 = WC_ROWS as u32;

/// Digital rain: two drops fall down every column and leave the new layout behind.
#[derive(Debug, Clone)]
pub struct Matrix {
    /// Head row of the first drop per column; negative while the column waits to start.
    heads: [i16; WC_COLUMNS],
    colors: [LedColor; WC_COLUMNS],
}

impl Matrix {
    pub fn new(canvas: &mut Canvas, green: bool) -> Self {
        let mut heads = [0; WC_COLUMNS];
        let mut colors = [LedColor::GREEN; WC_COLUMNS];
        for (head, color) in heads.iter_mut().zip(colors.iter_mut()) {
            *head = -i16::try_from(canvas.random(MAX_DELAY + 1)).unwrap_or(0);
            if !green {
                let phase = u8::try_from(canvas.random(u32::from(RAINBOW_PHASES))).unwrap_or(0);
                *color = rainbow_color(phase);
            }
        }
        Self { heads, colors }
    }

    /// Brightness divisor of `row` for a drop whose head is at `head`, if the trail covers it.
    fn trail(head: i16, row: i16) -> Option<u8> {
        let behind = head - row;
        (0..TRAIL)
            .contains(&behind)
            .then(|| u8::try_from(behind + 1).unwrap_or(u8::MAX))
    }

    pub fn step(&mut self, canvas: &mut Canvas) -> Progress {
        self.heads.iter_mut().for_each(|head| *head += 1);
        let done = self
            .heads
            .iter()
            .all(|&head| head - DROP_SPACING > LAST_ROW + TRAIL);
        if done {
            return canvas.finish();
        }

        for (row, col) in LedPlane::positions() {
            let head = self.heads[col];
            let row_i = i16::try_from(row).unwrap_or(i16::MAX);
            let revealed = head - row_i > REVEAL_DISTANCE;
            let plane = if revealed { Plane::Target } else { Plane::Current };
            let mut color = match (canvas.plane.get(row, col, plane), revealed) {
                (false, _) => LedColor::OFF,
                (true, true) => canvas.on,
                (true, false) => canvas.previous,
            };
            let divisor = Self::trail(head, row_i).or_else(|| Self::trail(head - DROP_SPACING, row_i));
            if let Some(divisor) = divisor {
                color = canvas.dimmed(self.colors[col]).divided(divisor);
            }
            canvas.frame.set(row, col, color);
        }
        Progress::Running
    }
}
