//! Transitions from the `Current` to the `Target` bit-plane.
//!
//! [`AnimationEngine::arm`] requests a transition; [`AnimationEngine::tick`] is called at 64 Hz.
//! The first tick after arming starts the selected animation and draws its first frame; later
//! ticks advance it every `deceleration` ticks until it reports [`Progress::Done`]. Every
//! animation finishes with `Current == Target` and the frame showing `Current`.

mod cube;
mod explode;
mod fade;
mod falling;
mod flicker;
mod matrix;
mod roll;
mod snake;
mod squeeze;
mod teletype;

use oorandom::Rand32;

use crate::color::{LedColor, MAX_COLOR_STEP};
use crate::config::{AnimationMode, DisplayConfig};
use crate::led_plane::{Frame, LedPlane, Plane};

use cube::Cube;
use explode::Explode;
use fade::Fade;
use falling::Falling;
use flicker::Flicker;
use matrix::Matrix;
use roll::Roll;
use snake::Snake;
use squeeze::Squeeze;
use teletype::Teletype;

/// Whether an animation step finished the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Running,
    Done,
}

/// What animations draw on: the bit-planes, the logical frame and the colors in effect.
#[derive(Debug, Clone)]
pub struct Canvas {
    pub plane: LedPlane,
    pub frame: Frame,
    /// Dimmed display color.
    pub on: LedColor,
    /// Dimmed display color before the transition started.
    pub previous: LedColor,
    /// Dimming factor in effect, for animation-specific colors.
    pub factor: u8,
    pub rng: Rand32,
}

impl Canvas {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            plane: LedPlane::new(),
            frame: Frame::new(),
            on: LedColor::OFF,
            previous: LedColor::OFF,
            factor: MAX_COLOR_STEP,
            rng: Rand32::new(seed),
        }
    }

    /// Paint `Current` in the display color.
    pub fn show_current(&mut self) {
        self.frame.paint(&self.plane, Plane::Current, self.on);
    }

    /// Commit `Target` and show it.
    pub fn finish(&mut self) -> Progress {
        self.plane.commit_target();
        self.previous = self.on;
        self.show_current();
        Progress::Done
    }

    /// Uniform random value in `0..upper` (`upper > 0`).
    pub fn random(&mut self, upper: u32) -> u32 {
        self.rng.rand_range(0..upper.max(1))
    }

    /// `color` scaled to the current brightness.
    #[must_use]
    pub const fn dimmed(&self, color: LedColor) -> LedColor {
        color.dim(self.factor)
    }
}

#[derive(Debug, Clone)]
enum Running {
    Idle,
    Fade(Fade),
    Roll(Roll),
    Explode(Explode),
    Snake(Snake),
    Teletype(Teletype),
    Cube(Cube),
    Matrix(Matrix),
    Falling(Falling),
    Squeeze(Squeeze),
    Flicker(Flicker),
}

impl Running {
    fn start(mode: AnimationMode, canvas: &mut Canvas) -> Self {
        match mode {
            AnimationMode::None | AnimationMode::Random => Self::Idle,
            AnimationMode::Fade => Self::Fade(Fade::new()),
            AnimationMode::Roll => Self::Roll(Roll::new(canvas)),
            AnimationMode::Explode => Self::Explode(Explode::new()),
            AnimationMode::Snake => Self::Snake(Snake::new(canvas)),
            AnimationMode::Teletype => Self::Teletype(Teletype::new()),
            AnimationMode::Cube => Self::Cube(Cube::new()),
            AnimationMode::Matrix => Self::Matrix(Matrix::new(canvas, false)),
            AnimationMode::GreenMatrix => Self::Matrix(Matrix::new(canvas, true)),
            AnimationMode::Drop => Self::Falling(Falling::new(canvas)),
            AnimationMode::Squeeze => Self::Squeeze(Squeeze::new(canvas)),
            AnimationMode::Flicker => Self::Flicker(Flicker::new()),
        }
    }

    fn step(&mut self, canvas: &mut Canvas) -> Progress {
        match self {
            Self::Idle => canvas.finish(),
            Self::Fade(fade) => fade.step(canvas),
            Self::Roll(roll) => roll.step(canvas),
            Self::Explode(explode) => explode.step(canvas),
            Self::Snake(snake) => snake.step(canvas),
            Self::Teletype(teletype) => teletype.step(canvas),
            Self::Cube(cube) => cube.step(canvas),
            Self::Matrix(matrix) => matrix.step(canvas),
            Self::Falling(falling) => falling.step(canvas),
            Self::Squeeze(squeeze) => squeeze.step(canvas),
            Self::Flicker(flicker) => flicker.step(canvas),
        }
    }
}

/// Dispatches the selected transition at 64 Hz.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    running: Running,
    mode: AnimationMode,
    deceleration: u8,
    counter: u8,
    start_flag: bool,
    stop_flag: bool,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            running: Running::Idle,
            mode: AnimationMode::None,
            deceleration: 0,
            counter: 0,
            start_flag: false,
            stop_flag: true,
        }
    }

    /// Request a transition on the next tick. A running transition restarts from its current
    /// state.
    pub const fn arm(&mut self) {
        self.start_flag = true;
    }

    /// Whether a transition is pending or in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.start_flag || !self.stop_flag
    }

    /// The animation actually running (resolved from [`AnimationMode::Random`]).
    #[must_use]
    pub const fn running_mode(&self) -> AnimationMode {
        self.mode
    }

    /// Advance by one 64 Hz tick. Returns `true` if the frame changed.
    pub fn tick(&mut self, canvas: &mut Canvas, config: &DisplayConfig) -> bool {
        if self.start_flag {
            self.start_flag = false;
            self.stop_flag = false;
            self.mode = resolve_mode(config, canvas);
            self.deceleration = config.animation(self.mode).deceleration;
            self.counter = 0;
            #[cfg(feature = "defmt")]
            defmt::info!("Animation start: {}", self.mode);
            self.running = Running::start(self.mode, canvas);
            self.stop_flag = self.running.step(canvas) == Progress::Done;
            return true;
        }
        if self.stop_flag {
            return false;
        }

        self.counter = self.counter.saturating_add(1);
        if self.counter < self.deceleration {
            return false;
        }
        self.counter = 0;
        self.stop_flag = self.running.step(canvas) == Progress::Done;
        if self.stop_flag {
            self.running = Running::Idle;
        }
        true
    }
}

/// Resolve [`AnimationMode::Random`] to one of the favourites, or `None` if there are none.
fn resolve_mode(config: &DisplayConfig, canvas: &mut Canvas) -> AnimationMode {
    if config.animation_mode != AnimationMode::Random {
        return config.animation_mode;
    }
    let is_favourite = |mode: &AnimationMode| mode.is_configurable() && config.animation(*mode).favourite;
    let count = AnimationMode::ALL.iter().filter(|mode| is_favourite(*mode)).count();
    let Ok(count) = u32::try_from(count) else {
        return AnimationMode::None;
    };
    if count == 0 {
        return AnimationMode::None;
    }
    let pick = canvas.random(count) as usize;
    AnimationMode::ALL
        .into_iter()
        .filter(is_favourite)
        .nth(pick)
        .unwrap_or(AnimationMode::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_with_transition() -> Canvas {
        let mut canvas = Canvas::new(7);
        canvas.on = LedColor::WHITE;
        canvas.previous = LedColor::WHITE;
        canvas.plane.set(0, 0, Plane::Current, true);
        canvas.plane.set(9, 10, Plane::Target, true);
        canvas
    }

    #[test]
    fn deceleration_spaces_steps() {
        let mut config = DisplayConfig::default();
        config.animation_mode = AnimationMode::Flicker;
        config.animations[AnimationMode::Flicker.index()].deceleration = 3;
        let mut canvas = canvas_with_transition();
        let mut engine = AnimationEngine::new();
        engine.arm();
        assert!(engine.tick(&mut canvas, &config));
        assert!(!engine.tick(&mut canvas, &config));
        assert!(!engine.tick(&mut canvas, &config));
        assert!(engine.tick(&mut canvas, &config));
    }

    #[test]
    fn random_without_favourites_switches_immediately() {
        let mut config = DisplayConfig::default();
        config.animation_mode = AnimationMode::Random;
        config
            .animations
            .iter_mut()
            .for_each(|setting| setting.favourite = false);
        let mut canvas = canvas_with_transition();
        let mut engine = AnimationEngine::new();
        engine.arm();
        engine.tick(&mut canvas, &config);
        assert_eq!(engine.running_mode(), AnimationMode::None);
        assert!(!engine.is_active());
        assert!(canvas.plane.planes_equal(Plane::Current, Plane::Target));
    }

    #[test]
    fn random_picks_a_favourite() {
        let mut config = DisplayConfig::default();
        config.animation_mode = AnimationMode::Random;
        config
            .animations
            .iter_mut()
            .for_each(|setting| setting.favourite = false);
        config.animations[AnimationMode::Cube.index()].favourite = true;
        let mut canvas = canvas_with_transition();
        let mut engine = AnimationEngine::new();
        engine.arm();
        engine.tick(&mut canvas, &config);
        assert_eq!(engine.running_mode(), AnimationMode::Cube);
    }

    #[test]
    fn snake_ignores_leftover_calc_bits() {
        let mut config = DisplayConfig::default();
        config.animation_mode = AnimationMode::Snake;
        let mut canvas = canvas_with_transition();
        canvas.plane.fill(Plane::Calc, true);
        let mut engine = AnimationEngine::new();
        engine.arm();
        assert!(engine.tick(&mut canvas, &config));
        assert!(!canvas.plane.any(Plane::Calc));
        // The snake has not reached the new word yet.
        assert!(canvas.frame.get(9, 10).is_off());
    }
}
