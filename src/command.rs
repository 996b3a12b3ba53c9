//! Single-byte serial speed commands.

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Absolute speed index, already checked against the maximum.
    SetSpeed(u8),
}

impl Command {
    /// Parse one received byte as an ASCII digit speed command.
    pub fn parse(byte: u8, max_index: u8) -> Result<Self, CommandError> {
        if !byte.is_ascii_digit() {
            return Err(CommandError::NotADigit(byte));
        }
        let index = byte - b'0';
        if index > max_index {
            return Err(CommandError::OutOfRange(byte));
        }
        Ok(Command::SetSpeed(index))
    }
}

/// True for bytes a terminal appends after a command.
#[inline]
pub fn is_line_end(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}
