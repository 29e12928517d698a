//! Structural frame validation
//!
//! Checks run in a fixed order and the first failure decides the reason:
//! length, then markers, then checksum. A frame either passes every check
//! or is rejected whole.

use crate::error::ErrorKind;
use crate::frame::Frame;
use crate::variant::ProtocolVariant;

/// Check raw bytes against a variant's framing rules
pub fn validate(protocol: &ProtocolVariant, bytes: &[u8]) -> Result<(), ErrorKind> {
    if bytes.len() != protocol.frame_len {
        return Err(ErrorKind::LengthMismatch);
    }

    if !bytes.starts_with(protocol.header) {
        return Err(ErrorKind::MarkerMismatch);
    }

    if let Some(trailer) = protocol.trailer {
        if bytes[protocol.frame_len - 1] != trailer {
            return Err(ErrorKind::MarkerMismatch);
        }
    }

    if !protocol.checksum.verify(bytes) {
        return Err(ErrorKind::ChecksumMismatch);
    }

    Ok(())
}

/// A frame that passed [`validate`] for a specific variant
///
/// Only [`Frame::validate`] constructs this, so decoding can never see
/// unchecked bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidFrame {
    frame: Frame,
    protocol: &'static ProtocolVariant,
}

impl ValidFrame {
    pub(crate) fn new(frame: Frame, protocol: &'static ProtocolVariant) -> Self {
        Self { frame, protocol }
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    pub fn protocol(&self) -> &'static ProtocolVariant {
        self.protocol
    }

    pub fn received_at_ms(&self) -> u32 {
        self.frame.received_at_ms()
    }
}
