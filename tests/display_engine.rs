//! Display engine behavior around the supply rail, word tables and color handling.

use wordclock_kit::color::{LedColor, daylight_color};
use wordclock_kit::config::{ColorAnimationMode, DisplayFlags};
use wordclock_kit::display::{ClockFlags, Display};
use wordclock_kit::hardware::{AlwaysOn, NoSync, PowerRail, StripBuffer, SyncEvent, SyncNotifier};
use wordclock_kit::led_plane::{Plane, TOTAL_LED_COUNT};
use wordclock_kit::persist::RamStore;
use wordclock_kit::word_tables::{GermanWordTables, WordRect, WordSet, WordTables};

type Store = RamStore<256>;
type Strip = StripBuffer<TOTAL_LED_COUNT>;

#[derive(Default)]
struct Recorder(Vec<SyncEvent>);

impl SyncNotifier for Recorder {
    fn notify(&mut self, event: SyncEvent) {
        self.0.push(event);
    }
}

#[derive(Default)]
struct CountingRail {
    ons: usize,
    offs: usize,
}

impl PowerRail for CountingRail {
    fn power_on(&mut self) {
        self.ons += 1;
    }

    fn power_off(&mut self) {
        self.offs += 1;
    }
}

/// Tables whose data never finishes loading.
struct PendingTables;

impl WordTables for PendingTables {
    fn load(&mut self, _mode: u8) {}

    fn complete(&self) -> bool {
        false
    }

    fn mode_count(&self) -> u8 {
        1
    }

    fn fill_words(&self, _words: &mut WordSet, _hour: u8, _minute: u8, _show_it_is: bool) -> bool {
        false
    }

    fn word_rect(&self, _index: usize) -> Option<WordRect> {
        None
    }
}

fn synced() -> Display<GermanWordTables, Strip, AlwaysOn, Recorder, Store> {
    Display::new(
        GermanWordTables::new(),
        StripBuffer::new(),
        AlwaysOn,
        Recorder::default(),
        Store::new(),
        3,
    )
}

#[test]
fn unloaded_tables_turn_the_status_led_blue() {
    let mut display = Display::new(
        PendingTables,
        Strip::new(),
        AlwaysOn,
        NoSync,
        Store::new(),
        1,
    );
    assert!(!display.clock(10, 20, ClockFlags(ClockFlags::POWER_ON)));
    assert!(!display.status_color().is_off());
    assert!(display.status_color().blue > 0);
    assert!(!display.plane().any(Plane::Target));
    assert!(!display.animation_active());
}

#[test]
fn loaded_tables_clear_the_status_led() {
    let mut display = synced();
    assert!(display.clock(10, 20, ClockFlags(ClockFlags::POWER_ON)));
    assert!(display.status_color().is_off());
    assert!(display.plane().any(Plane::Target));
}

#[test]
fn power_off_cuts_the_rail_once_dark() {
    let mut display = Display::new(
        GermanWordTables::new(),
        Strip::new(),
        CountingRail::default(),
        NoSync,
        Store::new(),
        2,
    );
    display.clock(7, 12, ClockFlags(ClockFlags::POWER_ON));
    for _ in 0..2_000 {
        display.tick();
    }
    assert_eq!(display.power_rail().ons, 1);
    assert_eq!(display.power_rail().offs, 0);

    display.clock(7, 12, ClockFlags(ClockFlags::POWER_OFF));
    for _ in 0..2_000 {
        display.tick();
    }
    assert_eq!(display.power_rail().offs, 1);
    assert!(display.ambilight_leds().iter().all(|led| led.is_off()));
    assert!(display.minute_colors().iter().all(|led| led.is_off()));

    display.clock(7, 13, ClockFlags(ClockFlags::POWER_ON));
    assert_eq!(display.power_rail().ons, 2);
}

#[test]
fn rainbow_cycling_changes_both_colors() {
    let mut display = synced();
    display.set_color_animation_deceleration(1, false, false);
    display.set_color_animation_mode(ColorAnimationMode::Rainbow, false, false);
    display.clock(10, 0, ClockFlags(ClockFlags::POWER_ON));
    for _ in 0..20 {
        display.tick();
    }
    let first = display.display_color();
    display.tick();
    assert_ne!(display.display_color(), first);
    assert_eq!(display.ambilight_color(), display.display_color());
    assert_eq!(display.config().display_color, synced().config().display_color);
}

#[test]
fn daylight_follows_the_hour() {
    let mut display = synced();
    display.set_color_animation_mode(ColorAnimationMode::Daylight, false, false);
    display.clock(6, 0, ClockFlags(ClockFlags::POWER_ON));
    assert_eq!(display.display_color(), daylight_color(6));
    display.clock(21, 0, ClockFlags::default());
    assert_eq!(display.display_color(), daylight_color(21));
    assert_eq!(display.ambilight_color(), daylight_color(21));
}

#[test]
fn linked_display_color_moves_the_ambilight() {
    let mut display = synced();
    assert!(display.config().flags.contains(DisplayFlags::SYNC_AMBILIGHT));
    let color = LedColor::rgb(5, 40, 12);
    display.set_display_color(color, false, true);
    assert_eq!(display.config().ambilight_color, color);
    assert_eq!(display.ambilight_color(), color);
    assert_eq!(display.notifier().0, [SyncEvent::DisplayColor(color)]);
}

#[test]
fn linked_ambilight_color_moves_the_display() {
    let mut display = synced();
    let color = LedColor::rgb(30, 0, 50);
    display.set_ambilight_color(color, true, true);
    assert_eq!(display.config().display_color, color);
    assert_eq!(display.display_color(), color);
    assert_eq!(display.ambilight_color(), color);
    assert_eq!(
        display.notifier().0,
        [SyncEvent::AmbilightColor(color), SyncEvent::DisplayColor(color)]
    );
    assert_eq!(display.store().writes(), 1);
}

#[test]
fn unlinked_ambilight_color_stays_separate() {
    let mut display = synced();
    let mut flags = display.config().flags;
    flags.set(DisplayFlags::SYNC_AMBILIGHT, false);
    display.set_flags(flags, false, false);
    let before = display.display_color();

    let color = LedColor::rgb(0, 63, 0);
    display.set_ambilight_color(color, false, true);
    assert_eq!(display.ambilight_color(), color);
    assert_eq!(display.display_color(), before);
    assert_eq!(display.notifier().0, [SyncEvent::AmbilightColor(color)]);
}

#[test]
fn linking_copies_the_display_color() {
    let mut display = synced();
    let mut flags = display.config().flags;
    flags.set(DisplayFlags::SYNC_AMBILIGHT, false);
    display.set_flags(flags, false, false);
    display.set_ambilight_color(LedColor::rgb(0, 0, 63), false, false);
    display.set_display_color(LedColor::rgb(63, 0, 0), false, false);
    assert_eq!(display.ambilight_color(), LedColor::rgb(0, 0, 63));

    flags.set(DisplayFlags::SYNC_AMBILIGHT, true);
    display.set_flags(flags, false, false);
    assert_eq!(display.ambilight_color(), LedColor::rgb(63, 0, 0));
    assert_eq!(display.config().ambilight_color, LedColor::rgb(63, 0, 0));
}
