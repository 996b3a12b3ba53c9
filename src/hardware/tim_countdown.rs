//! One-shot countdown on a general purpose STM32 timer.
//!
//! The timer counts up at a fixed prescaled tick rate with auto-reload
//! preload disabled, so a new ARR written from the update interrupt applies
//! to the cycle that just started.

use embassy_stm32::time::Hertz;
use embassy_stm32::timer::CoreInstance;
use embassy_stm32::timer::low_level::Timer;

use super::traits::Countdown;

pub struct TimCountdown<'d, T: CoreInstance> {
    tim: Timer<'d, T>,
}

impl<'d, T: CoreInstance> TimCountdown<'d, T> {
    /// Configure `tim` to count at `tick_hz` with the update interrupt enabled.
    ///
    /// The counter is left stopped; arm it and call [`start`](Self::start).
    pub fn new(tim: Timer<'d, T>, tick_hz: Hertz) -> Self {
        tim.stop();
        tim.set_autoreload_preload(false);

        let clock = tim.get_clock_frequency();
        let psc = (clock.0 / tick_hz.0).saturating_sub(1);
        let regs = tim.regs_core();
        regs.psc().write_value(psc.min(u16::MAX as u32) as u16);
        regs.arr().write(|w| w.set_arr(u16::MAX));

        // Latch the prescaler now instead of at the first overflow.
        regs.egr().write(|w| w.set_ug(true));
        tim.clear_update_interrupt();
        tim.enable_update_interrupt(true);

        Self { tim }
    }

    #[inline]
    pub fn start(&mut self) {
        self.tim.start();
    }

    /// Acknowledge the update interrupt. Returns `true` if it was pending.
    #[inline]
    pub fn on_interrupt(&mut self) -> bool {
        self.tim.clear_update_interrupt()
    }
}

impl<'d, T: CoreInstance> Countdown for TimCountdown<'d, T> {
    fn arm(&mut self, ticks: u32) {
        let arr = ticks.saturating_sub(1).min(u16::MAX as u32) as u16;
        self.tim.regs_core().arr().write(|w| w.set_arr(arr));
    }
}
