//! Shared speed index and the two paths that change it.
//!
//! The index is read by the phase timer interrupt and written by the button
//! handler and the serial command loop. It lives in a single `AtomicU8` with
//! relaxed loads and stores: a torn value is impossible at this width and a
//! reader seeing the previous value for up to one PWM period is acceptable.
//! The two writers do not exclude each other; the last store wins.

use core::sync::atomic::{AtomicU8, Ordering};

use heapless::Vec;

use crate::command::{Command, is_line_end};
use crate::config::LINE_END;
use crate::error::CommandError;

/// Speed index in `0..=max`. Higher values mean a longer low phase.
pub struct SpeedIndex {
    value: AtomicU8,
    max: u8,
}

impl SpeedIndex {
    pub const fn new(initial: u8, max: u8) -> Self {
        let initial = if initial > max { max } else { initial };
        Self {
            value: AtomicU8::new(initial),
            max,
        }
    }

    #[inline]
    pub fn get(&self) -> u8 {
        self.value.load(Ordering::Relaxed)
    }

    /// Store `index`, clamped to the maximum.
    #[inline]
    pub fn set(&self, index: u8) {
        self.value.store(index.min(self.max), Ordering::Relaxed);
    }

    #[inline]
    pub fn max(&self) -> u8 {
        self.max
    }
}

/// Set of button sources with a pending edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeSet(u8);

impl EdgeSet {
    pub const NONE: Self = Self(0);
    /// Source A: raises the index (slows the motor).
    pub const SLOWER: Self = Self(1 << 0);
    /// Source B: lowers the index (speeds the motor up).
    pub const FASTER: Self = Self(1 << 4);
    pub const BOTH: Self = Self(Self::SLOWER.0 | Self::FASTER.0);

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::BOTH.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl core::ops::BitOr for EdgeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Latched pending flags, one bit per button source.
///
/// Sources `raise` their bit when an edge is detected; the handler `take`s and
/// clears the whole set in one step, so each asserted edge is acknowledged
/// exactly once no matter how the two sides interleave.
pub struct PendingEdges(AtomicU8);

impl PendingEdges {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    #[inline]
    pub fn raise(&self, edges: EdgeSet) {
        self.0.fetch_or(edges.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub fn take(&self) -> EdgeSet {
        EdgeSet::from_bits_truncate(self.0.swap(0, Ordering::AcqRel))
    }

    #[inline]
    pub fn peek(&self) -> EdgeSet {
        EdgeSet::from_bits_truncate(self.0.load(Ordering::Acquire))
    }
}

impl Default for PendingEdges {
    fn default() -> Self {
        Self::new()
    }
}

/// Line written back over the serial channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Echo {
    /// New speed index after a button edge, sent as a digit.
    Status(u8),
    /// Raw byte of an accepted command.
    Received(u8),
    /// Raw byte of a rejected command, followed by `?`.
    Rejected(u8),
}

impl Echo {
    /// Bytes to transmit, including the line terminator.
    pub fn line(&self) -> Vec<u8, 4> {
        let mut out = Vec::new();
        // Capacity 4 covers the longest form: byte, '?', CR, LF.
        let _ = match *self {
            Echo::Status(index) => out.push(b'0' + index),
            Echo::Received(byte) => out.push(byte),
            Echo::Rejected(byte) => out.push(byte).and_then(|_| out.push(b'?')),
        };
        let _ = out.extend_from_slice(LINE_END);
        out
    }
}

/// Applies button edges and serial commands to a [`SpeedIndex`].
#[derive(Clone, Copy)]
pub struct SpeedSetter<'a> {
    speed: &'a SpeedIndex,
}

impl<'a> SpeedSetter<'a> {
    pub fn new(speed: &'a SpeedIndex) -> Self {
        Self { speed }
    }

    #[inline]
    pub fn speed(&self) -> u8 {
        self.speed.get()
    }

    /// Button handler: apply every pending source, then report the result once.
    ///
    /// Both sources are checked independently, so a simultaneous press of
    /// both buttons nets out to no change.
    pub fn on_edges(&self, edges: EdgeSet) -> Echo {
        let before = self.speed.get();
        let mut index = before;

        if edges.contains(EdgeSet::SLOWER) && index < self.speed.max() {
            index += 1;
        }
        if edges.contains(EdgeSet::FASTER) && index > 0 {
            index -= 1;
        }

        self.speed.set(index);
        debug!("edges {=u8:b}: speed {} -> {}", edges.bits(), before, index);
        Echo::Status(index)
    }

    /// Command loop handler for one received byte.
    ///
    /// Returns `Ok(None)` for line terminators, which are skipped silently.
    /// A rejected byte leaves the speed unchanged.
    pub fn on_command(&self, byte: u8) -> Result<Option<Echo>, CommandError> {
        if is_line_end(byte) {
            return Ok(None);
        }
        match Command::parse(byte, self.speed.max())? {
            Command::SetSpeed(index) => {
                self.speed.set(index);
                info!("serial: speed set to {}", index);
            }
        }
        Ok(Some(Echo::Received(byte)))
    }
}
