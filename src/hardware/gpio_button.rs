use super::traits::Button;
use embedded_hal::digital::InputPin;
use embedded_hal_async::{delay::DelayNs, digital::Wait};

/// Active-low push button on an edge-capable input.
pub struct DebouncedButton<P, D> {
    pin: P,
    delay: D,
    debounce_ms: u32,
}

impl<P, D> DebouncedButton<P, D>
where
    P: InputPin + Wait,
    D: DelayNs,
{
    pub fn new(pin: P, delay: D, debounce_ms: u32) -> Self {
        Self {
            pin,
            delay,
            debounce_ms,
        }
    }

    /// Wait for a falling edge that is still low after the debounce interval.
    pub async fn wait_for_press(&mut self) {
        loop {
            if self.pin.wait_for_falling_edge().await.is_err() {
                continue;
            }
            self.delay.delay_ms(self.debounce_ms).await;
            if self.is_pressed() {
                return;
            }
        }
    }

    /// Wait until the button has been released.
    pub async fn wait_for_release(&mut self) {
        while self.is_pressed() {
            if self.pin.wait_for_rising_edge().await.is_err() {
                return;
            }
        }
    }

    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

impl<P, D> Button for DebouncedButton<P, D>
where
    P: InputPin,
{
    fn is_pressed(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }
}
