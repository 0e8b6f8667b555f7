//! Host-level tests for the face wiring primitives.

use wordclock_kit::led_layout::LedLayout;
use wordclock_kit::led_plane::{DISPLAY_LAYOUT, DISPLAY_LED_COUNT, WC_COLUMNS, WC_ROWS};

#[test]
fn serpentine_row_major_reverses_odd_rows() {
    const SNAKE: LedLayout<9, 3, 3> = LedLayout::serpentine_row_major();
    assert_eq!(
        *SNAKE.map(),
        [
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 1),
            (1, 1),
            (0, 1),
            (0, 2),
            (1, 2),
            (2, 2),
        ]
    );
    assert_eq!(SNAKE.mapping_by_xy(), [0, 1, 2, 5, 4, 3, 6, 7, 8]);
}

#[test]
fn explicit_wiring_matches_the_snake_builder() {
    const SNAKE: LedLayout<6, 3, 2> = LedLayout::serpentine_row_major();
    const WIRED: LedLayout<6, 3, 2> =
        LedLayout::new([(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1)]);
    assert_eq!(SNAKE, WIRED);
    assert_eq!(WIRED.mapping_by_xy(), [0, 1, 2, 5, 4, 3]);
}

#[test]
fn face_layout_is_a_snake() {
    let by_xy = DISPLAY_LAYOUT.mapping_by_xy();
    assert_eq!(by_xy.len(), DISPLAY_LED_COUNT);
    // Row 0 runs left-to-right.
    assert_eq!(by_xy[0], 0);
    assert_eq!(usize::from(by_xy[WC_COLUMNS - 1]), WC_COLUMNS - 1);
    // Row 1 runs right-to-left.
    assert_eq!(usize::from(by_xy[WC_COLUMNS]), 2 * WC_COLUMNS - 1);
    assert_eq!(usize::from(by_xy[2 * WC_COLUMNS - 1]), WC_COLUMNS);
    // Last LED sits in the last row.
    let last_row_start = (WC_ROWS - 1) * WC_COLUMNS;
    assert!(usize::from(by_xy[last_row_start]) >= last_row_start);
}
