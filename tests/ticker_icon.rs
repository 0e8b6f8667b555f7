//! Ticker scrolling and icon playback, alone and through the display engine.

use wordclock_kit::Error;
use wordclock_kit::animation::Canvas;
use wordclock_kit::color::LedColor;
use wordclock_kit::display::{ClockFlags, Display};
use wordclock_kit::hardware::{AlwaysOn, NoSync, StripBuffer};
use wordclock_kit::icon::{Icon, IconCell, IconPlayer, IconProgress};
use wordclock_kit::led_plane::{LedPlane, Plane, TOTAL_LED_COUNT, WC_COLUMNS};
use wordclock_kit::persist::RamStore;
use wordclock_kit::ticker::{TICKER_CAPACITY, TICKER_COLS, Ticker, TickerProgress};
use wordclock_kit::word_tables::GermanWordTables;

type TestDisplay =
    Display<GermanWordTables, StripBuffer<TOTAL_LED_COUNT>, AlwaysOn, NoSync, RamStore<256>>;

fn display() -> TestDisplay {
    Display::new(
        GermanWordTables::new(),
        StripBuffer::new(),
        AlwaysOn,
        NoSync,
        RamStore::new(),
        5,
    )
}

fn lit(canvas: &Canvas) -> usize {
    LedPlane::positions()
        .filter(|&(row, col)| !canvas.frame.get(row, col).is_off())
        .count()
}

#[test]
fn ticker_advances_one_character_per_glyph_width() {
    let mut canvas = Canvas::new(1);
    canvas.on = LedColor::WHITE;
    let mut ticker = Ticker::new();
    ticker.set_text("AB").expect("fits");
    assert_eq!(ticker.current_char(), Some('A'));

    for _ in 0..=TICKER_COLS {
        assert_eq!(ticker.tick(&mut canvas, 1), TickerProgress::Scrolled);
    }
    assert_eq!(ticker.current_char(), Some('B'));
    assert_eq!(ticker.position(), Some(1));
    assert!(lit(&canvas) > 0);
}

#[test]
fn ticker_scrolls_the_text_off_the_face() {
    let mut canvas = Canvas::new(1);
    canvas.on = LedColor::WHITE;
    let mut ticker = Ticker::new();
    ticker.set_text("AB").expect("fits");

    let columns = 2 * (TICKER_COLS + 1) + WC_COLUMNS;
    for _ in 1..columns {
        assert_eq!(ticker.tick(&mut canvas, 1), TickerProgress::Scrolled);
    }
    assert_eq!(ticker.position(), None);
    assert_eq!(ticker.tick(&mut canvas, 1), TickerProgress::Finished);
    assert!(!ticker.is_active());
    assert_eq!(lit(&canvas), 0);
    assert_eq!(ticker.tick(&mut canvas, 1), TickerProgress::Idle);
}

#[test]
fn ticker_deceleration_holds_columns() {
    let mut canvas = Canvas::new(1);
    let mut ticker = Ticker::new();
    ticker.set_text("X").expect("fits");
    assert_eq!(ticker.tick(&mut canvas, 3), TickerProgress::Waiting);
    assert_eq!(ticker.tick(&mut canvas, 3), TickerProgress::Waiting);
    assert_eq!(ticker.tick(&mut canvas, 3), TickerProgress::Scrolled);
}

#[test]
fn empty_text_does_not_start() {
    let mut ticker = Ticker::new();
    ticker.set_text("").expect("fits");
    assert!(!ticker.is_active());
}

#[test]
fn display_ticker_returns_to_the_clock() {
    let mut display = display();
    display.clock(9, 45, ClockFlags(ClockFlags::POWER_ON));
    for _ in 0..500 {
        display.tick();
    }
    assert!(!display.animation_active());
    assert!(display.plane().any(Plane::Current));

    let mut waits = 0;
    display
        .show_ticker_blocking("Hi", || waits += 1)
        .expect("fits");
    assert!(!display.ticker_active());
    assert!(waits >= 2 * (TICKER_COLS + 1) + WC_COLUMNS);
    // The clock comes back with a transition.
    assert!(display.animation_active());
    for _ in 0..2_000 {
        display.tick();
    }
    assert!(display.plane().planes_equal(Plane::Current, Plane::Target));
    assert!(display.plane().any(Plane::Current));
}

#[test]
fn overlong_ticker_is_rejected_by_the_display() {
    let mut display = display();
    let text: String = "x".repeat(TICKER_CAPACITY + 1);
    assert_eq!(display.set_ticker(&text), Err(Error::TickerTooLong));
    assert!(!display.ticker_active());
}

fn heart() -> Icon {
    let mut icon = Icon::new(2, 2, 1).expect("fits");
    icon.set_palette(1, LedColor::RED).expect("in palette");
    for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        let cell = IconCell {
            color: 1,
            on_step: u8::try_from(row * 2 + col).expect("small"),
            off_step: 0,
        };
        icon.set_cell(row, col, cell).expect("inside");
    }
    icon
}

#[test]
fn icon_fades_in_holds_and_fades_out() {
    let mut canvas = Canvas::new(1);
    let mut player = IconPlayer::new();
    player.show(heart());

    let mut peak = 0;
    let mut ticks = 0;
    loop {
        ticks += 1;
        assert!(ticks < 1_000, "icon never finished");
        match player.tick(&mut canvas) {
            IconProgress::Drew => peak = peak.max(lit(&canvas)),
            IconProgress::Finished => break,
            IconProgress::Idle => panic!("icon stopped without finishing"),
        }
    }
    assert_eq!(peak, 4);
    // One second of hold at 64 Hz plus both fades.
    assert!(ticks > 64);
    assert!(!player.is_active());
    assert_eq!(lit(&canvas), 0);
    assert!(!canvas.plane.any(Plane::New));
}

#[test]
fn icon_is_centered_on_the_face() {
    let mut canvas = Canvas::new(1);
    let mut player = IconPlayer::new();
    player.show(heart());
    for _ in 0..30 {
        player.tick(&mut canvas);
    }
    assert!(!canvas.frame.get(4, 4).is_off());
    assert!(!canvas.frame.get(5, 5).is_off());
    assert!(canvas.frame.get(0, 0).is_off());
    assert!(canvas.frame.get(4, 6).is_off());
}

#[test]
fn display_icon_hands_back_to_the_clock() {
    let mut display = display();
    display.clock(12, 0, ClockFlags(ClockFlags::POWER_ON));
    display.show_icon(heart());
    assert!(display.icon_active());
    for _ in 0..400 {
        display.tick();
    }
    assert!(!display.icon_active());
    for _ in 0..2_000 {
        display.tick();
    }
    assert!(display.plane().planes_equal(Plane::Current, Plane::Target));
}
