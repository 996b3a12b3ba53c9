pub mod traits;

#[cfg(feature = "async")]
pub mod gpio_button;

#[cfg(feature = "firmware")]
pub mod tim_countdown;
#[cfg(feature = "firmware")]
pub mod uart_console;

pub use traits::{Button, Countdown};
