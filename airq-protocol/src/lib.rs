//! M702 / N702B Air Quality Module Protocol
//!
//! This crate defines the UART frames emitted by the M702 family of
//! multi-gas modules and the steps needed to turn raw serial bytes into
//! physical quantities.
//!
//! # Protocol Overview
//!
//! Every variant sends a fixed-length binary frame:
//! ```text
//! ┌────────┬──────────────────────────────┬──────────┬─────────┐
//! │ HEADER │ FIELDS                       │ CHECKSUM │ TRAILER │
//! │ 2B     │ fixed offsets per variant    │ 1-2B     │ 0-1B    │
//! └────────┴──────────────────────────────┴──────────┴─────────┘
//! ```
//!
//! Variant differences (length, markers, checksum algorithm, field table)
//! live in [`ProtocolVariant`] descriptor tables selected at construction.
//!
//! Pipeline: [`FrameReader`] → [`Frame::validate`] → [`decode`].

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod decode;
pub mod error;
pub mod frame;
pub mod quantity;
pub mod validate;
pub mod variant;

pub use checksum::{crc16_modbus, sum8, ChecksumAlgorithm, ChecksumSpec};
pub use decode::{decode, DecodedReading};
pub use error::ErrorKind;
pub use frame::{Frame, FrameReader, ReadOutcome, ReaderStats, MAX_FRAME_SIZE};
pub use quantity::Quantity;
pub use validate::{validate, ValidFrame};
pub use variant::{FieldEncoding, FieldSpec, ProtocolVariant, Variant, M702, N702B};
