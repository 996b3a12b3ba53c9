//! Fixed configuration of the software PWM and its control channels.

use crate::error::ConfigError;

/// Number of discrete speed steps above zero.
pub const SPEED_STEPS: u8 = 8;

/// Speed index used at power-up.
pub const DEFAULT_SPEED: u8 = 4;

/// Serial control channel baud rate.
pub const BAUD_RATE: u32 = 9600;

/// Terminator written after every echo.
pub const LINE_END: &[u8] = b"\r\n";

/// Settling time before a button edge is confirmed.
pub const DEBOUNCE_MS: u32 = 20;

/// PWM frequency: one full high+low cycle per millisecond.
pub const PWM_HZ: u32 = 1_000;

/// Tick-domain description of the PWM waveform.
///
/// `low_ticks(i) = base_ticks + i * step_ticks` for `i` in `0..=max_index`,
/// and the high phase fills the rest of `period_ticks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    pub period_ticks: u32,
    pub base_ticks: u32,
    pub step_ticks: u32,
    pub max_index: u8,
    pub default_index: u8,
}

impl PwmConfig {
    /// TM4C123 board running its SysTick at 80 MHz: 1 ms period in ten slices.
    pub const TM4C123: Self = Self {
        period_ticks: 80_000,
        base_ticks: 8_000,
        step_ticks: 8_000,
        max_index: SPEED_STEPS,
        default_index: DEFAULT_SPEED,
    };

    pub const DEFAULT: Self = Self::TM4C123;

    /// Same waveform shape for a timer counting at `tick_hz`.
    ///
    /// The period is split into `SPEED_STEPS + 2` equal slices; the low phase
    /// takes one slice at index 0 and one more per step.
    pub const fn for_tick_rate(tick_hz: u32, pwm_hz: u32) -> Self {
        let period_ticks = tick_hz / pwm_hz;
        let slice = period_ticks / (SPEED_STEPS as u32 + 2);
        Self {
            period_ticks,
            base_ticks: slice,
            step_ticks: slice,
            max_index: SPEED_STEPS,
            default_index: DEFAULT_SPEED,
        }
    }

    /// Check that every valid speed index yields a non-empty high phase.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.period_ticks == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.default_index > self.max_index {
            return Err(ConfigError::DefaultOutOfRange);
        }
        let slowest = self
            .step_ticks
            .checked_mul(self.max_index as u32)
            .and_then(|t| t.checked_add(self.base_ticks))
            .ok_or(ConfigError::PeriodTooShort)?;
        if slowest >= self.period_ticks {
            return Err(ConfigError::PeriodTooShort);
        }
        Ok(self)
    }
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_config_is_valid() {
        assert_eq!(PwmConfig::default().validate(), Ok(PwmConfig::TM4C123));
    }

    #[test]
    fn tick_rate_scaling_matches_source_shape() {
        assert_eq!(PwmConfig::for_tick_rate(80_000_000, PWM_HZ), PwmConfig::TM4C123);

        let bluepill = PwmConfig::for_tick_rate(8_000_000, PWM_HZ);
        assert_eq!(bluepill.period_ticks, 8_000);
        assert_eq!(bluepill.base_ticks, 800);
        assert_eq!(bluepill.step_ticks, 800);
        assert!(bluepill.validate().is_ok());
    }

    #[test]
    fn rejects_bad_configs() {
        let zero = PwmConfig {
            period_ticks: 0,
            ..PwmConfig::DEFAULT
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroPeriod));

        let full = PwmConfig {
            base_ticks: 16_000,
            ..PwmConfig::DEFAULT
        };
        assert_eq!(full.validate(), Err(ConfigError::PeriodTooShort));

        let overflow = PwmConfig {
            step_ticks: u32::MAX,
            ..PwmConfig::DEFAULT
        };
        assert_eq!(overflow.validate(), Err(ConfigError::PeriodTooShort));

        let default_high = PwmConfig {
            default_index: 9,
            ..PwmConfig::DEFAULT
        };
        assert_eq!(default_high.validate(), Err(ConfigError::DefaultOutOfRange));
    }
}
