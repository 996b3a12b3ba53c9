//! Serial control channel shared by the command loop and the button handler.

use embassy_stm32::mode::Async;
use embassy_stm32::usart::{self, UartRx, UartTx};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::mutex::Mutex;

use crate::control::speed::Echo;

/// Transmit half, locked per echo line so lines from different tasks never interleave.
pub struct Console {
    tx: Mutex<ThreadModeRawMutex, UartTx<'static, Async>>,
}

impl Console {
    pub fn new(tx: UartTx<'static, Async>) -> Self {
        Self { tx: Mutex::new(tx) }
    }

    pub async fn echo(&self, echo: Echo) {
        let line = echo.line();
        let mut tx = self.tx.lock().await;
        if let Err(e) = tx.write(&line).await {
            warn!("uart tx failed: {}", e);
        }
    }
}

/// Receive half of the command loop.
pub struct CommandRx {
    rx: UartRx<'static, Async>,
}

impl CommandRx {
    pub fn new(rx: UartRx<'static, Async>) -> Self {
        Self { rx }
    }

    /// Wait for the next byte. There is no timeout.
    pub async fn read_byte(&mut self) -> Result<u8, usart::Error> {
        let mut buf = [0u8; 1];
        self.rx.read(&mut buf).await?;
        Ok(buf[0])
    }
}
