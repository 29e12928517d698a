//! Board-agnostic driver logic for M702 / N702B air-quality modules
//!
//! This crate contains everything between the serial transport and the
//! output sinks that does not depend on a particular board:
//!
//! - Output sink traits and the quantity → sink binding table
//! - Publisher and validity/status tracking
//! - Poll state machine and the tick-driven driver
//! - Configuration types and the TOML-subset parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod publish;
pub mod scheduler;
pub mod sinks;

pub use config::{QuantitySet, SensorConfig};
pub use publish::{publish, ValidityState};
pub use scheduler::{AirQualityDriver, CycleOutcome, CycleReport, PollEvent, PollState};
pub use sinks::{BinarySink, SensorSink, SinkBindings, TextSink};

pub use airq_protocol::{DecodedReading, ErrorKind, Quantity, Variant};
