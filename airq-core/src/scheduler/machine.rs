//! Poll cycle state machine
//!
//! Every tick walks the machine from `Idle` through reading and either
//! back to `Idle` directly (incomplete, timed out) or via validation,
//! decoding and publishing.

/// Poll cycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollState {
    /// Waiting for the next tick
    #[default]
    Idle,
    /// Draining transport bytes into the frame buffer
    Reading,
    /// A full-length frame is buffered
    Complete,
    /// Not enough bytes this tick; partial data kept
    Incomplete,
    /// Tick budget exhausted without a frame, or the stale guard fired
    TimedOut,
    /// Checking length, markers and checksum
    Validating,
    /// Extracting quantities from a valid frame
    Decoding,
    /// Forwarding results to sinks
    Publishing,
}

/// Events that move the poll cycle forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollEvent {
    /// Scheduler tick fired
    Tick,
    /// Reader produced a full-length frame
    FrameReady,
    /// Reader needs more bytes
    NeedMore,
    /// No frame within the tick budget, or buffer declared stale
    Expired,
    /// Frame handed to the validator
    Validate,
    /// Frame passed validation
    Accepted,
    /// Frame failed validation
    Rejected,
    /// Quantities decoded
    Decoded,
    /// Sinks updated
    Published,
    /// End of a cycle that produced nothing to decode
    Settle,
}

impl PollState {
    /// Whether a cycle is in progress
    pub fn is_busy(&self) -> bool {
        !matches!(self, PollState::Idle)
    }

    /// Process an event and return the next state
    ///
    /// Unexpected events leave the state unchanged.
    pub fn transition(self, event: PollEvent) -> Self {
        use PollEvent::*;
        use PollState::*;

        match (self, event) {
            (Idle, Tick) => Reading,

            (Reading, FrameReady) => Complete,
            (Reading, NeedMore) => Incomplete,
            (Reading, Expired) => TimedOut,

            // Budget check happens after the drain came back short
            (Incomplete, Expired) => TimedOut,

            (Complete, Validate) => Validating,
            (Validating, Accepted) => Decoding,
            (Validating, Rejected) => Publishing,
            (Decoding, Decoded) => Publishing,
            (Publishing, Published) => Idle,

            // Reporting a timeout also goes through the publisher
            (TimedOut, Published) => Idle,
            (Incomplete, Settle) => Idle,
            (TimedOut, Settle) => Idle,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(start: PollState, events: &[PollEvent]) -> PollState {
        events.iter().fold(start, |s, &e| s.transition(e))
    }

    #[test]
    fn test_complete_cycle() {
        use PollEvent::*;
        let end = run(
            PollState::Idle,
            &[Tick, FrameReady, Validate, Accepted, Decoded, Published],
        );
        assert_eq!(end, PollState::Idle);
    }

    #[test]
    fn test_rejected_frame_still_publishes() {
        use PollEvent::*;
        let s = run(PollState::Idle, &[Tick, FrameReady, Validate, Rejected]);
        assert_eq!(s, PollState::Publishing);
        assert_eq!(s.transition(Published), PollState::Idle);
    }

    #[test]
    fn test_incomplete_returns_to_idle() {
        use PollEvent::*;
        let s = run(PollState::Idle, &[Tick, NeedMore]);
        assert_eq!(s, PollState::Incomplete);
        assert_eq!(s.transition(Settle), PollState::Idle);
    }

    #[test]
    fn test_timeout_path() {
        use PollEvent::*;
        let s = run(PollState::Idle, &[Tick, NeedMore, Expired]);
        assert_eq!(s, PollState::TimedOut);
        assert_eq!(s.transition(Published), PollState::Idle);
    }

    #[test]
    fn test_unexpected_event_is_ignored() {
        assert_eq!(
            PollState::Idle.transition(PollEvent::Decoded),
            PollState::Idle
        );
        assert_eq!(
            PollState::Reading.transition(PollEvent::Tick),
            PollState::Reading
        );
        assert!(!PollState::Idle.is_busy());
        assert!(PollState::Reading.is_busy());
    }
}
