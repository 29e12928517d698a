//! Adapter from the RP2040 buffered UART to the airq HAL traits

use airq_hal::{DataBits, Parity, StopBits, UartConfig, UartRx, UartTx};
use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embedded_io::{Read, ReadReady, Write};

/// Receive ring buffer size
pub const RX_BUF_SIZE: usize = 256;

/// Transmit ring buffer size (request commands are a few bytes)
pub const TX_BUF_SIZE: usize = 32;

/// Sensor UART, split halves of a `BufferedUart`
pub struct SensorUart {
    tx: BufferedUartTx,
    rx: BufferedUartRx,
}

impl SensorUart {
    pub fn new(tx: BufferedUartTx, rx: BufferedUartRx) -> Self {
        Self { tx, rx }
    }
}

impl UartRx for SensorUart {
    type Error = uart::Error;

    /// Upper bound on pending bytes
    ///
    /// The ring buffer only reports readiness, so this is its capacity
    /// while data is pending. Short reads end the drain early.
    fn bytes_available(&mut self) -> usize {
        match ReadReady::read_ready(&mut self.rx) {
            Ok(true) => RX_BUF_SIZE,
            _ => 0,
        }
    }

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // Read would wait for the first byte otherwise
        if buf.is_empty() || !ReadReady::read_ready(&mut self.rx)? {
            return Ok(0);
        }
        Read::read(&mut self.rx, buf)
    }
}

impl UartTx for SensorUart {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        Write::write_all(&mut self.tx, data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.tx)
    }
}

/// Translate line settings to the RP2040 UART config
///
/// Returns `None` for settings the peripheral cannot do (nine data bits).
pub fn rp_config(config: &UartConfig) -> Option<uart::Config> {
    let mut cfg = uart::Config::default();
    cfg.baudrate = config.baudrate;
    cfg.data_bits = match config.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
        DataBits::Nine => return None,
    };
    cfg.parity = match config.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match config.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    Some(cfg)
}
