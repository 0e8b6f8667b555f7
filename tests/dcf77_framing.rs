//! Feeds synthetic 100 Hz DCF77 signals through the decoder.

use wordclock_kit::dcf77::{Dcf77, Dcf77State, Dcf77Time};

const BIT_ZERO_TICKS: usize = 10;
const BIT_ONE_TICKS: usize = 20;
const SECOND_TICKS: usize = 100;

#[derive(Clone, Copy)]
struct Minute {
    hour: u8,
    minute: u8,
}

/// Collects every time the decoder publishes.
struct Receiver {
    decoder: Dcf77,
    times: Vec<Dcf77Time>,
}

impl Receiver {
    /// Past the power-on guard and synchronized to a minute marker.
    fn synced() -> Self {
        let mut receiver = Self {
            decoder: Dcf77::new(),
            times: Vec::new(),
        };
        receiver.level(false, 120);
        assert_eq!(receiver.decoder.state(), Dcf77State::Wait);
        // One stray second pulse, then the silent 59th second.
        receiver.level(true, BIT_ZERO_TICKS);
        receiver.level(false, 2 * SECOND_TICKS - BIT_ZERO_TICKS);
        receiver
    }

    fn level(&mut self, high: bool, ticks: usize) {
        for _ in 0..ticks {
            self.decoder.tick(high);
            if let Some(time) = self.decoder.take_time() {
                self.times.push(time);
            }
        }
    }

    fn second(&mut self, bit: bool, last: bool) {
        let pulse = if bit { BIT_ONE_TICKS } else { BIT_ZERO_TICKS };
        let pause = SECOND_TICKS - pulse + if last { SECOND_TICKS } else { 0 };
        self.level(true, pulse);
        self.level(false, pause);
    }

    fn frame(&mut self, bits: &[bool; 59]) {
        for (index, &bit) in bits.iter().enumerate() {
            self.second(bit, index == bits.len() - 1);
        }
    }

    /// Only the first `count` seconds of a frame.
    fn partial_frame(&mut self, bits: &[bool; 59], count: usize) {
        for &bit in bits.iter().take(count) {
            self.second(bit, false);
        }
    }
}

fn bcd(value: u8, width: usize, bits: &mut Vec<bool>) {
    let encoded = ((value / 10) << 4) | (value % 10);
    bits.extend((0..width).map(|bit| (encoded >> bit) & 1 == 1));
}

fn parity(bits: &mut Vec<bool>, from: usize) {
    let ones = bits[from..].iter().filter(|&&bit| bit).count();
    bits.push(ones % 2 == 1);
}

/// Thursday 2024-03-07, CET.
fn encode(time: Minute) -> [bool; 59] {
    let mut bits = vec![false; 17];
    bits.extend([false, true, false, true]); // CET, start of time
    bcd(time.minute, 7, &mut bits);
    parity(&mut bits, 21);
    bcd(time.hour, 6, &mut bits);
    parity(&mut bits, 29);
    bcd(7, 6, &mut bits);
    bcd(4, 3, &mut bits);
    bcd(3, 5, &mut bits);
    bcd(24, 8, &mut bits);
    parity(&mut bits, 36);
    bits.try_into().expect("59 bits")
}

fn at(minute: u8) -> Minute {
    Minute { hour: 14, minute }
}

fn expected(minute: u8) -> Dcf77Time {
    Dcf77Time {
        year: 124,
        month: 2,
        mday: 7,
        wday: 4,
        hour: 14,
        minute,
        second: 15,
        is_dst: false,
    }
}

#[test]
fn consecutive_minutes_publish_at_second_fifteen() {
    let mut receiver = Receiver::synced();
    receiver.frame(&encode(at(29)));
    receiver.frame(&encode(at(30)));
    assert!(receiver.times.is_empty());

    let next = encode(at(31));
    receiver.partial_frame(&next, 15);
    assert!(receiver.times.is_empty());
    receiver.second(next[15], false);
    assert_eq!(receiver.times, [expected(30)]);
}

#[test]
fn each_minute_is_handed_out_once() {
    let mut receiver = Receiver::synced();
    for minute in 29..=31 {
        receiver.frame(&encode(at(minute)));
    }
    receiver.partial_frame(&encode(at(32)), 16);
    assert_eq!(receiver.times, [expected(30), expected(31)]);
    assert!(!receiver.decoder.time_pending());
}

#[test]
fn minute_rollover_across_the_hour_is_accepted() {
    let mut receiver = Receiver::synced();
    receiver.frame(&encode(at(59)));
    receiver.frame(&encode(Minute { hour: 15, minute: 0 }));
    receiver.partial_frame(&encode(Minute { hour: 15, minute: 1 }), 16);
    assert_eq!(
        receiver.times,
        [Dcf77Time {
            hour: 15,
            minute: 0,
            ..expected(0)
        }]
    );
}

#[test]
fn parity_error_discards_the_frame() {
    let mut receiver = Receiver::synced();
    receiver.frame(&encode(at(29)));
    let mut corrupted = encode(at(30));
    corrupted[28] = !corrupted[28];
    receiver.frame(&corrupted);
    receiver.frame(&encode(at(31)));
    receiver.partial_frame(&encode(at(32)), 16);
    assert!(receiver.times.is_empty());
}

#[test]
fn decoder_recovers_after_a_parity_error() {
    let mut receiver = Receiver::synced();
    receiver.frame(&encode(at(29)));
    let mut corrupted = encode(at(30));
    corrupted[40] = !corrupted[40];
    receiver.frame(&corrupted);
    // The date parity fails on the last bit, so the next marker is missed as well.
    for minute in 31..=33 {
        receiver.frame(&encode(at(minute)));
    }
    receiver.partial_frame(&encode(at(34)), 16);
    assert_eq!(receiver.times, [expected(33)]);
}

#[test]
fn non_consecutive_minutes_are_not_trusted() {
    let mut receiver = Receiver::synced();
    receiver.frame(&encode(at(10)));
    receiver.frame(&encode(at(12)));
    receiver.partial_frame(&encode(at(13)), 16);
    assert!(receiver.times.is_empty());
}

#[test]
fn lost_carrier_resynchronizes() {
    let mut receiver = Receiver::synced();
    receiver.partial_frame(&encode(at(29)), 20);
    assert_eq!(receiver.decoder.bit_index(), Some(20));
    receiver.level(false, 300);
    assert_eq!(receiver.decoder.bit_index(), None);
    assert_ne!(receiver.decoder.state(), Dcf77State::Low);
}

#[test]
fn decoded_time_converts_to_a_calendar_date() {
    let date = expected(30).to_primitive_date_time().expect("valid date");
    assert_eq!(date.year(), 2024);
    assert_eq!(u8::from(date.month()), 3);
    assert_eq!(date.day(), 7);
    assert_eq!((date.hour(), date.minute(), date.second()), (14, 30, 15));
}
