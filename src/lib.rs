//! Word-clock firmware core: DCF77 decoding, word layout, transition animations, ticker, icons,
//! ambilight and persisted settings.
//!
//! Everything is `no_std` and tick driven; hardware is reached through the traits in
//! [`hardware`] and [`persist::ConfigStore`]. The optional `embassy` feature adds async loops in
//! `runner`.
#![cfg_attr(not(test), no_std)]

pub mod ambilight;
pub mod animation;
pub mod color;
pub mod config;
pub mod dcf77;
pub mod display;
mod error;
pub mod hardware;
pub mod icon;
pub mod led_layout;
pub mod led_plane;
pub mod persist;
#[cfg(feature = "embassy")]
pub mod runner;
pub mod ticker;
pub mod wall_clock;
pub mod word_tables;

pub use error::{Error, Result};
