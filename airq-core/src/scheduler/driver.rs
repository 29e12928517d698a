//! Tick-driven air-quality driver
//!
//! Ties the frame reader, validator, decoder and publisher together. The
//! host calls [`AirQualityDriver::tick`] at the configured interval; each
//! call does one non-blocking cycle and always returns.

use airq_hal::{UartRx, UartTx};
use airq_protocol::{
    decode, DecodedReading, ErrorKind, Frame, FrameReader, ReadOutcome, ReaderStats,
};

use super::machine::{PollEvent, PollState};
use crate::config::SensorConfig;
use crate::publish::{publish, ValidityState};
use crate::sinks::SinkBindings;

/// What a single tick achieved
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Valid frame decoded; `sinks` numeric sinks received a value
    Published { reading: DecodedReading, sinks: usize },
    /// Complete frame failed validation
    Rejected(ErrorKind),
    /// Frame not finished yet; retried next tick
    Incomplete { buffered: usize },
    /// Reported invalid because of the tick budget or the stale guard
    TimedOut(ErrorKind),
}

/// Per-tick summary, meant for logging
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Bytes drained from the transport this tick
    pub bytes_read: u32,
    /// A request command was written upstream this tick
    pub request_sent: bool,
    /// Consecutive ticks without a complete frame, after this tick
    pub ticks_without_frame: u32,
}

/// Poll driver for one air-quality module
#[derive(Debug)]
pub struct AirQualityDriver<'a> {
    config: SensorConfig,
    reader: FrameReader,
    bindings: SinkBindings<'a>,
    state: PollState,
    validity: ValidityState,
    last_reading: Option<DecodedReading>,
    ticks_without_frame: u32,
    timeout_ticks: u32,
}

impl<'a> AirQualityDriver<'a> {
    /// Create a driver for the configured variant
    pub fn new(config: SensorConfig, bindings: SinkBindings<'a>) -> Self {
        let reader = FrameReader::new(config.variant.protocol(), config.max_noise_bytes as usize);
        Self {
            timeout_ticks: config.timeout_ticks(),
            config,
            reader,
            bindings,
            state: PollState::Idle,
            validity: ValidityState::Unknown,
            last_reading: None,
            ticks_without_frame: 0,
        }
    }

    /// Reset the cycle and announce the driver on the status sink
    pub fn setup(&mut self) {
        self.reader.reset();
        self.state = PollState::Idle;
        self.validity = ValidityState::Unknown;
        self.ticks_without_frame = 0;
        publish(&DecodedReading::default(), &self.bindings, &self.validity);
    }

    /// Run one poll cycle
    pub fn tick<U: UartRx + UartTx>(&mut self, uart: &mut U, now_ms: u32) -> CycleReport {
        let bytes_before = self.reader.stats().bytes_read;
        self.state = self.state.transition(PollEvent::Tick);

        // A partial frame means a response is already on its way
        let request_sent = !self.reader.has_partial() && self.send_request(uart);

        let outcome = match self.reader.poll_once(uart, now_ms) {
            ReadOutcome::Complete(frame) => {
                self.state = self.state.transition(PollEvent::FrameReady);
                self.process(frame)
            }
            ReadOutcome::Incomplete { buffered } => {
                self.state = self.state.transition(PollEvent::NeedMore);
                self.missed(buffered)
            }
            ReadOutcome::Stale { .. } => {
                self.ticks_without_frame = self.ticks_without_frame.saturating_add(1);
                self.state = self.state.transition(PollEvent::Expired);
                self.report_timeout(ErrorKind::StaleBuffer)
            }
        };

        CycleReport {
            outcome,
            bytes_read: self.reader.stats().bytes_read.wrapping_sub(bytes_before),
            request_sent,
            ticks_without_frame: self.ticks_without_frame,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn validity(&self) -> ValidityState {
        self.validity
    }

    /// Most recent valid reading
    pub fn last_reading(&self) -> Option<&DecodedReading> {
        self.last_reading.as_ref()
    }

    pub fn reader_stats(&self) -> ReaderStats {
        self.reader.stats()
    }

    /// Bytes currently held in the frame buffer
    pub fn buffered(&self) -> usize {
        self.reader.buffered()
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn ticks_without_frame(&self) -> u32 {
        self.ticks_without_frame
    }

    fn send_request<U: UartTx>(&mut self, uart: &mut U) -> bool {
        match self.reader.protocol().request {
            Some(request) => uart
                .write_blocking(request)
                .and_then(|()| uart.flush())
                .is_ok(),
            None => false,
        }
    }

    fn process(&mut self, frame: Frame) -> CycleOutcome {
        self.state = self.state.transition(PollEvent::Validate);

        match frame.validate(self.reader.protocol()) {
            Ok(valid) => {
                self.state = self.state.transition(PollEvent::Accepted);
                let reading = decode(&valid);
                self.state = self.state.transition(PollEvent::Decoded);

                self.validity = ValidityState::Valid;
                self.ticks_without_frame = 0;
                self.last_reading = Some(reading);
                let sinks = publish(&reading, &self.bindings, &self.validity);
                self.state = self.state.transition(PollEvent::Published);

                CycleOutcome::Published { reading, sinks }
            }
            Err(kind) => {
                // A complete frame arrived, so the module is still talking
                self.ticks_without_frame = 0;
                self.state = self.state.transition(PollEvent::Rejected);
                self.validity = ValidityState::Invalid(kind);
                publish(&DecodedReading::default(), &self.bindings, &self.validity);
                self.state = self.state.transition(PollEvent::Published);

                CycleOutcome::Rejected(kind)
            }
        }
    }

    fn missed(&mut self, buffered: usize) -> CycleOutcome {
        self.ticks_without_frame = self.ticks_without_frame.saturating_add(1);

        if self.ticks_without_frame < self.timeout_ticks {
            self.state = self.state.transition(PollEvent::Settle);
            return CycleOutcome::Incomplete { buffered };
        }

        self.state = self.state.transition(PollEvent::Expired);
        self.reader.reset();
        self.report_timeout(ErrorKind::NoData)
    }

    fn report_timeout(&mut self, kind: ErrorKind) -> CycleOutcome {
        self.validity = ValidityState::Invalid(kind);
        publish(&DecodedReading::default(), &self.bindings, &self.validity);
        self.state = self.state.transition(PollEvent::Published);
        CycleOutcome::TimedOut(kind)
    }
}
