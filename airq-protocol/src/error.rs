//! Error taxonomy for the read / validate / decode cycle
//!
//! None of these are fatal. The driver discards the offending bytes and
//! tries again on the next tick.

/// Reasons a poll cycle produced no reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Not enough bytes yet; retried next tick and never shown to sinks
    IncompleteFrame,
    /// Frame length differs from the variant's fixed size
    LengthMismatch,
    /// Header or trailer bytes do not match the protocol constants
    MarkerMismatch,
    /// Checksum over the frame does not match the transmitted one
    ChecksumMismatch,
    /// Too many bytes consumed without forming a frame; buffer was reset
    StaleBuffer,
    /// No complete frame within the tick budget
    NoData,
}

impl ErrorKind {
    /// Short human-readable text, suitable for a status sink
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::IncompleteFrame => "Incomplete Frame",
            ErrorKind::LengthMismatch => "Length Error",
            ErrorKind::MarkerMismatch => "Header Error",
            ErrorKind::ChecksumMismatch => "Checksum Error",
            ErrorKind::StaleBuffer => "Stale Data",
            ErrorKind::NoData => "No Data",
        }
    }

    /// Whether the condition should be reported to validity/status sinks
    pub fn is_reported(&self) -> bool {
        !matches!(self, ErrorKind::IncompleteFrame)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_is_not_reported() {
        assert!(!ErrorKind::IncompleteFrame.is_reported());
        assert!(ErrorKind::ChecksumMismatch.is_reported());
        assert!(ErrorKind::NoData.is_reported());
    }

    #[test]
    fn test_status_text() {
        assert_eq!(ErrorKind::NoData.as_str(), "No Data");
        assert_eq!(ErrorKind::ChecksumMismatch.as_str(), "Checksum Error");
    }
}
