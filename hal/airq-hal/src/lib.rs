//! airq Hardware Abstraction Layer
//!
//! This crate defines the transport traits the sensor drivers are written
//! against. Chip-specific code (the RP2040 firmware, host test mocks)
//! implements them, so the same driver runs on any serial port.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (airq-firmware, tests)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  airq-core / airq-protocol              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  airq-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`uart::UartRx`] - Non-blocking serial receive
//! - [`uart::UartTx`] - Serial transmit (request commands)

#![no_std]
#![deny(unsafe_code)]

pub mod uart;

pub use uart::{DataBits, Parity, StopBits, Uart, UartConfig, UartRx, UartTx};
