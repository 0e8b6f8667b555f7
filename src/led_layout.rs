//! A fully const description of how the word-clock face is wired.
//!
//! The LED strip behind the letter matrix runs as a "snake": even rows left-to-right, odd rows
//! right-to-left. [`LedLayout`] records the `(col, row)` of every strip LED and inverts that into
//! the lookup the renderer needs (`row * W + col` -> strip index), all at compile time.

/// The `(col, row)` location of each LED on the strip.
///
/// # Examples
///
/// ```rust
/// use wordclock_kit::led_layout::LedLayout;
///
/// const SNAKE: LedLayout<6, 3, 2> = LedLayout::serpentine_row_major();
/// const EXPECTED: LedLayout<6, 3, 2> =
///     LedLayout::new([(0, 0), (1, 0), (2, 0), (2, 1), (1, 1), (0, 1)]);
/// assert_eq!(SNAKE, EXPECTED);
/// ```
///
/// ```text
/// Serpentine 3×2:
///   LED0  LED1  LED2
///   LED5  LED4  LED3
/// ```
///
/// Compile-time validation catches configuration errors:
///
/// ```compile_fail
/// # use wordclock_kit::led_layout::LedLayout;
/// // Duplicate coordinate (0,0) - caught at compile time
/// const INVALID: LedLayout<3, 3, 1> = LedLayout::new([(0, 0), (0, 0), (1, 0)]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedLayout<const N: usize, const W: usize, const H: usize> {
    map: [(u16, u16); N],
}

impl<const N: usize, const W: usize, const H: usize> LedLayout<N, W, H> {
    /// Access the checked (col,row) mapping.
    #[must_use]
    pub const fn map(&self) -> &[(u16, u16); N] {
        &self.map
    }

    /// Reverse lookup: `row * W + col` -> strip LED index.
    ///
    /// ```rust
    /// use wordclock_kit::led_layout::LedLayout;
    ///
    /// const LED_LAYOUT: LedLayout<6, 3, 2> = LedLayout::serpentine_row_major();
    /// const MAPPING_BY_XY: [u16; 6] = LED_LAYOUT.mapping_by_xy();
    /// assert_eq!(MAPPING_BY_XY, [0, 1, 2, 5, 4, 3]);
    /// ```
    #[must_use]
    pub const fn mapping_by_xy(&self) -> [u16; N] {
        assert!(
            N <= u16::MAX as usize,
            "total LEDs must fit in u16 for mapping_by_xy"
        );

        let mut mapping = [None; N];

        let mut led_index = 0;
        while led_index < N {
            let (col, row) = self.map[led_index];
            let target_index = row as usize * W + col as usize;

            let slot = &mut mapping[target_index];
            assert!(
                slot.is_none(),
                "duplicate (col,row) in mapping_by_xy inversion"
            );
            *slot = Some(led_index as u16);

            led_index += 1;
        }

        let mut finalized = [0u16; N];
        let mut i = 0;
        while i < N {
            finalized[i] = match mapping[i] {
                Some(led_index) => led_index,
                None => panic!("mapping_by_xy requires every (col,row) to be covered"),
            };
            i += 1;
        }

        finalized
    }

    /// Constructor: verifies mapping covers every cell exactly once across the W×H grid.
    #[must_use]
    pub const fn new(map: [(u16, u16); N]) -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");

        let mut seen = [false; N];

        let mut i = 0;
        while i < N {
            let (c, r) = map[i];
            let c = c as usize;
            let r = r as usize;

            assert!(c < W, "column out of bounds");
            assert!(r < H, "row out of bounds");

            let cell = r * W + c;
            assert!(!seen[cell], "duplicate (col,row) in mapping");
            seen[cell] = true;

            i += 1;
        }

        let mut k = 0;
        while k < N {
            assert!(seen[k], "mapping does not cover every cell");
            k += 1;
        }

        Self { map }
    }

    /// Snake wiring: even rows left-to-right, odd rows right-to-left.
    #[must_use]
    pub const fn serpentine_row_major() -> Self {
        assert!(W > 0 && H > 0, "W and H must be positive");
        assert!(W * H == N, "W*H must equal N");

        let mut mapping = [(0_u16, 0_u16); N];
        let mut row_index = 0;
        while row_index < H {
            let mut column_index = 0;
            while column_index < W {
                let led_index = if row_index % 2 == 0 {
                    row_index * W + column_index
                } else {
                    row_index * W + (W - 1 - column_index)
                };
                mapping[led_index] = (column_index as u16, row_index as u16);
                column_index += 1;
            }
            row_index += 1;
        }
        Self::new(mapping)
    }
}
