//! UART serial communication abstractions
//!
//! The sensor drivers are polled from a cooperative tick, so receive is
//! non-blocking: a driver asks how many bytes are waiting and drains them
//! without ever suspending.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been queued or an error occurs. Request
    /// commands are a handful of bytes, well inside any TX FIFO.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
///
/// Non-blocking receive used by tick-driven drivers.
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Number of bytes that can be read right now without blocking
    fn bytes_available(&mut self) -> usize;

    /// Read up to `buf.len()` bytes that are already received
    ///
    /// Never waits for more data. Returns `Ok(0)` when nothing is pending.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Read a single byte if one is pending
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        let mut buf = [0u8; 1];
        match self.read_available(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

/// Combined UART interface
///
/// For UARTs that provide both TX and RX on a single peripheral.
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// Line settings used by the M702 and N702B modules (9600 8N1)
    pub const fn air_quality_module() -> Self {
        Self {
            baudrate: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self::air_quality_module()
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OneShot {
        pending: Option<u8>,
    }

    impl UartRx for OneShot {
        type Error = ();

        fn bytes_available(&mut self) -> usize {
            self.pending.is_some() as usize
        }

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            match (self.pending.take(), buf.first_mut()) {
                (Some(b), Some(slot)) => {
                    *slot = b;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_try_read_byte_drains_then_reports_none() {
        let mut rx = OneShot { pending: Some(0x3C) };
        assert_eq!(rx.bytes_available(), 1);
        assert_eq!(rx.try_read_byte(), Ok(Some(0x3C)));
        assert_eq!(rx.try_read_byte(), Ok(None));
        assert_eq!(rx.bytes_available(), 0);
    }

    #[test]
    fn test_default_is_module_line_settings() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 9600);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
