//! Error types for configuration and serial command handling.

use core::fmt;

/// Rejected [`PwmConfig`](crate::config::PwmConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Total period of zero ticks.
    ZeroPeriod,
    /// The slowest speed leaves no high phase inside the period.
    PeriodTooShort,
    /// Startup speed lies above the highest speed index.
    DefaultOutOfRange,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroPeriod => write!(f, "period must be at least one tick"),
            Self::PeriodTooShort => write!(f, "slowest low phase does not fit in the period"),
            Self::DefaultOutOfRange => write!(f, "default speed index above maximum"),
        }
    }
}

/// A serial byte that could not be turned into a speed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// The byte is not an ASCII digit.
    NotADigit(u8),
    /// The digit is above the highest speed index.
    OutOfRange(u8),
}

impl CommandError {
    /// The raw byte that was received.
    pub fn byte(&self) -> u8 {
        match *self {
            Self::NotADigit(b) | Self::OutOfRange(b) => b,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotADigit(b) => write!(f, "byte 0x{:02X} is not a digit", b),
            Self::OutOfRange(b) => write!(f, "speed '{}' out of range", *b as char),
        }
    }
}

/// Crate-level error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    Config(ConfigError),
    Command(CommandError),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {}", e),
            Self::Command(e) => write!(f, "command: {}", e),
        }
    }
}
