//! Speed index to phase duration mapping.

use crate::config::PwmConfig;

/// Tick counts for one PWM period.
///
/// `high_ticks + low_ticks` always equals the configured period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseDurations {
    pub high_ticks: u32,
    pub low_ticks: u32,
}

impl PhaseDurations {
    #[inline]
    pub fn period_ticks(&self) -> u32 {
        self.high_ticks + self.low_ticks
    }

    /// Share of the period spent in the low (active) phase, in permille.
    pub fn duty_permille(&self) -> u32 {
        let period = self.period_ticks() as u64;
        if period == 0 {
            return 0;
        }
        (self.low_ticks as u64 * 1000 / period) as u32
    }
}

impl PwmConfig {
    /// Phase durations for `index`.
    ///
    /// `index` must be in `0..=max_index`; callers clamp or validate first.
    #[inline]
    pub fn durations(&self, index: u8) -> PhaseDurations {
        debug_assert!(index <= self.max_index, "speed index {} above max", index);
        let low_ticks = self.base_ticks + index as u32 * self.step_ticks;
        PhaseDurations {
            high_ticks: self.period_ticks.saturating_sub(low_ticks),
            low_ticks,
        }
    }
}

/// Free-function form of [`PwmConfig::durations`].
#[inline]
pub fn duty_cycle(config: &PwmConfig, index: u8) -> PhaseDurations {
    config.durations(index)
}
