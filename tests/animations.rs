//! Every transition must end on the target layout.

use wordclock_kit::animation::{AnimationEngine, Canvas};
use wordclock_kit::color::LedColor;
use wordclock_kit::config::{AnimationMode, DisplayConfig};
use wordclock_kit::led_plane::{LedPlane, Plane, WC_COLUMNS, WC_ROWS};

const TICK_LIMIT: usize = 20_000;

fn canvas(seed: u64) -> Canvas {
    let mut canvas = Canvas::new(seed);
    canvas.on = LedColor::rgb(40, 30, 20);
    canvas.previous = canvas.on;
    // "ES IST" and a full row as the old time, a scattered pattern as the new one.
    for col in [0, 1, 3, 4, 5] {
        canvas.plane.set(0, col, Plane::Current, true);
    }
    for col in 0..WC_COLUMNS {
        canvas.plane.set(5, col, Plane::Current, true);
    }
    for (row, col) in LedPlane::positions().filter(|(row, col)| (row * 3 + col) % 7 == 0) {
        canvas.plane.set(row, col, Plane::Target, true);
    }
    canvas.show_current();
    canvas
}

/// Ticks until the engine goes idle.
fn run(engine: &mut AnimationEngine, canvas: &mut Canvas, config: &DisplayConfig) -> usize {
    engine.arm();
    let mut ticks = 0;
    while engine.is_active() {
        engine.tick(canvas, config);
        ticks += 1;
        assert!(ticks < TICK_LIMIT, "{:?} never finished", engine.running_mode());
    }
    ticks
}

fn assert_settled(canvas: &Canvas) {
    assert!(canvas.plane.planes_equal(Plane::Current, Plane::Target));
    for (row, col) in LedPlane::positions() {
        let expected = if canvas.plane.get(row, col, Plane::Target) {
            canvas.on
        } else {
            LedColor::OFF
        };
        assert_eq!(canvas.frame.get(row, col), expected, "cell ({row}, {col})");
    }
}

#[test]
fn every_mode_ends_on_the_target() {
    for mode in AnimationMode::ALL {
        for seed in [1, 42, 9_999] {
            let mut config = DisplayConfig::default();
            config.animation_mode = mode;
            let mut canvas = canvas(seed);
            let mut engine = AnimationEngine::new();
            run(&mut engine, &mut canvas, &config);
            assert_settled(&canvas);
        }
    }
}

#[test]
fn blank_to_blank_finishes() {
    for mode in AnimationMode::ALL {
        let mut config = DisplayConfig::default();
        config.animation_mode = mode;
        let mut canvas = Canvas::new(3);
        let mut engine = AnimationEngine::new();
        run(&mut engine, &mut canvas, &config);
        assert_settled(&canvas);
        assert!(!canvas.plane.any(Plane::Current));
    }
}

#[test]
fn none_switches_on_the_first_tick() {
    let mut config = DisplayConfig::default();
    config.animation_mode = AnimationMode::None;
    let mut canvas = canvas(5);
    let mut engine = AnimationEngine::new();
    assert_eq!(run(&mut engine, &mut canvas, &config), 1);
    assert_settled(&canvas);
}

#[test]
fn slower_setting_takes_longer() {
    let mut fast = DisplayConfig::default();
    fast.animation_mode = AnimationMode::Fade;
    let mut slow = fast.clone();
    if let Some(setting) = fast.animations.get_mut(AnimationMode::Fade.index()) {
        setting.deceleration = 1;
    }
    if let Some(setting) = slow.animations.get_mut(AnimationMode::Fade.index()) {
        setting.deceleration = 4;
    }

    let fast_ticks = run(&mut AnimationEngine::new(), &mut canvas(8), &fast);
    let slow_ticks = run(&mut AnimationEngine::new(), &mut canvas(8), &slow);
    assert!(slow_ticks > fast_ticks);
}

#[test]
fn random_picks_only_favourites() {
    let mut config = DisplayConfig::default();
    config.animation_mode = AnimationMode::Random;
    for setting in &mut config.animations {
        setting.favourite = false;
    }
    if let Some(setting) = config.animations.get_mut(AnimationMode::Cube.index()) {
        setting.favourite = true;
    }

    let mut canvas = canvas(11);
    let mut engine = AnimationEngine::new();
    engine.arm();
    engine.tick(&mut canvas, &config);
    assert_eq!(engine.running_mode(), AnimationMode::Cube);
}

#[test]
fn random_without_favourites_switches_directly() {
    let mut config = DisplayConfig::default();
    config.animation_mode = AnimationMode::Random;
    for setting in &mut config.animations {
        setting.favourite = false;
    }

    let mut canvas = canvas(12);
    let mut engine = AnimationEngine::new();
    assert_eq!(run(&mut engine, &mut canvas, &config), 1);
    assert_eq!(engine.running_mode(), AnimationMode::None);
    assert_settled(&canvas);
}

#[test]
fn face_dimensions_match_the_planes() {
    assert_eq!(LedPlane::positions().count(), WC_ROWS * WC_COLUMNS);
}
