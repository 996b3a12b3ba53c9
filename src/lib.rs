//! # Software PWM Motor Speed Control
//!
//! Drives a DC motor with a software-timed PWM signal. A one-shot timer
//! interrupt toggles the output pin and re-arms itself with the duration of
//! the phase it just entered; the duty cycle follows a shared speed index that
//! two push buttons and a 9600 baud serial command channel adjust.
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`config`] | Tick-domain waveform description and channel constants |
//! | [`control`] | Duty-cycle calculator, phase toggler, speed setter |
//! | [`command`] | Single-byte serial command parsing |
//! | [`hardware`] | Seam traits and STM32 implementations |
//!
//! The library is `no_std`. The STM32F103 firmware lives in
//! `src/bin/speed_controller.rs` and needs the `firmware` feature:
//!
//! ```bash
//! cargo run --release --features firmware --target thumbv7m-none-eabi
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod command;
pub mod config;
pub mod control;
pub mod error;
pub mod hardware;

pub use config::PwmConfig;
pub use error::{CommandError, ConfigError, Error};
