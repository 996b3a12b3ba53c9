//! Two-state toggler that synthesizes the PWM waveform from countdown expiries.
//!
//! Each expiry flips the output, re-reads the speed index and arms the
//! countdown with the duration of the phase just entered. Because the index is
//! sampled on every toggle, a speed change in the middle of a period produces
//! one transitional period whose halves come from different speeds.

use embedded_hal::digital::OutputPin;

use crate::config::PwmConfig;
use crate::control::speed::SpeedIndex;
use crate::hardware::traits::Countdown;

/// Level currently driven on the PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    High,
    Low,
}

impl Phase {
    #[inline]
    pub fn toggled(self) -> Self {
        match self {
            Phase::High => Phase::Low,
            Phase::Low => Phase::High,
        }
    }
}

pub struct PhaseToggler {
    config: PwmConfig,
    phase: Phase,
}

impl PhaseToggler {
    pub fn new(config: PwmConfig, initial: Phase) -> Self {
        Self {
            config,
            phase: initial,
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn config(&self) -> &PwmConfig {
        &self.config
    }

    /// Drive the initial level and arm the first countdown.
    pub fn start<P, C>(
        &mut self,
        pin: &mut P,
        timer: &mut C,
        speed: &SpeedIndex,
    ) -> Result<u32, P::Error>
    where
        P: OutputPin,
        C: Countdown,
    {
        self.enter(self.phase, pin, timer, speed)
    }

    /// Countdown expiry: switch to the other phase.
    ///
    /// Returns the tick count the countdown was armed with.
    pub fn fire<P, C>(
        &mut self,
        pin: &mut P,
        timer: &mut C,
        speed: &SpeedIndex,
    ) -> Result<u32, P::Error>
    where
        P: OutputPin,
        C: Countdown,
    {
        self.enter(self.phase.toggled(), pin, timer, speed)
    }

    fn enter<P, C>(
        &mut self,
        next: Phase,
        pin: &mut P,
        timer: &mut C,
        speed: &SpeedIndex,
    ) -> Result<u32, P::Error>
    where
        P: OutputPin,
        C: Countdown,
    {
        match next {
            Phase::High => pin.set_high()?,
            Phase::Low => pin.set_low()?,
        }
        self.phase = next;

        let durations = self.config.durations(speed.get());
        let ticks = match next {
            Phase::High => durations.high_ticks,
            Phase::Low => durations.low_ticks,
        };
        timer.arm(ticks);
        Ok(ticks)
    }
}
