//! Publishing decoded readings to sinks
//!
//! Numeric sinks only ever see values from a valid frame. On an invalid
//! cycle they keep their last good value, while the validity and status
//! sinks are refreshed to show what went wrong.

use airq_protocol::{DecodedReading, ErrorKind};

use crate::sinks::SinkBindings;

/// Validity of the most recent reported cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidityState {
    /// No cycle reported yet
    #[default]
    Unknown,
    /// Last frame passed validation
    Valid,
    /// Last cycle failed
    Invalid(ErrorKind),
}

impl ValidityState {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidityState::Valid)
    }

    /// Text for the status sink
    pub fn status_text(&self) -> &'static str {
        match self {
            ValidityState::Unknown => "Initializing",
            ValidityState::Valid => "Online",
            ValidityState::Invalid(kind) => kind.as_str(),
        }
    }

    /// Failure reason, if invalid
    pub fn error(&self) -> Option<ErrorKind> {
        match self {
            ValidityState::Invalid(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Forward a cycle's result to the bound sinks
///
/// Returns the number of numeric sinks that received a value. Validity and
/// status are refreshed on every reported cycle; an `IncompleteFrame` cycle
/// is not reported and leaves them untouched.
pub fn publish(
    reading: &DecodedReading,
    bindings: &SinkBindings<'_>,
    validity: &ValidityState,
) -> usize {
    let mut published = 0;

    if validity.is_valid() {
        for (quantity, value) in reading.iter() {
            if let Some(sink) = bindings.sensor(quantity) {
                sink.publish(value);
                published += 1;
            }
        }
    }

    // Incomplete frames are retried silently
    if validity.error().is_some_and(|kind| !kind.is_reported()) {
        return published;
    }

    if let Some(sink) = bindings.validity() {
        if !matches!(validity, ValidityState::Unknown) {
            sink.publish(validity.is_valid());
        }
    }

    if let Some(sink) = bindings.status() {
        sink.publish(validity.status_text());
    }

    published
}
