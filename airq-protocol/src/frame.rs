//! Frame accumulation from a non-blocking UART
//!
//! [`FrameReader`] drains whatever bytes the transport already holds,
//! aligns on the variant's header and hands out a [`Frame`] once the fixed
//! frame length is buffered. Partial frames survive across ticks.

use heapless::Vec;

use airq_hal::UartRx;

use crate::error::ErrorKind;
use crate::validate::{validate, ValidFrame};
use crate::variant::ProtocolVariant;

/// Largest frame any supported variant emits, with headroom
pub const MAX_FRAME_SIZE: usize = 32;

/// Bytes pulled from the transport per read call
const DRAIN_CHUNK: usize = 16;

/// Raw bytes of one candidate message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: Vec<u8, MAX_FRAME_SIZE>,
    received_at_ms: u32,
}

impl Frame {
    /// Wrap raw bytes received at `received_at_ms`
    pub fn new(bytes: &[u8], received_at_ms: u32) -> Result<Self, ErrorKind> {
        let bytes = Vec::from_slice(bytes).map_err(|_| ErrorKind::LengthMismatch)?;
        Ok(Self {
            bytes,
            received_at_ms,
        })
    }

    /// Frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Received length
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Tick time at which the last byte arrived
    pub fn received_at_ms(&self) -> u32 {
        self.received_at_ms
    }

    /// Validate against a variant, consuming the frame
    ///
    /// This is the only way to obtain a [`ValidFrame`].
    pub fn validate(self, protocol: &'static ProtocolVariant) -> Result<ValidFrame, ErrorKind> {
        validate(protocol, &self.bytes)?;
        Ok(ValidFrame::new(self, protocol))
    }
}

/// Result of one non-blocking drain
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadOutcome {
    /// A full-length frame is ready for validation
    Complete(Frame),
    /// More bytes needed; `buffered` bytes are kept for the next poll
    Incomplete { buffered: usize },
    /// The stale-data guard fired and the buffer was reset
    Stale { discarded: usize },
}

/// Running counters, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReaderStats {
    /// Bytes pulled from the transport
    pub bytes_read: u32,
    /// Bytes dropped while hunting for a header
    pub noise_bytes: u32,
    /// Frames handed out
    pub frames: u32,
    /// Valid frames replaced by a newer one within the same drain
    pub superseded: u32,
    /// Complete frames that failed validation
    pub rejected: u32,
    /// Stale-data guard resets
    pub stale_resets: u32,
}

/// Accumulates transport bytes into fixed-length frames
#[derive(Debug, Clone)]
pub struct FrameReader {
    protocol: &'static ProtocolVariant,
    buffer: Vec<u8, MAX_FRAME_SIZE>,
    /// Bytes consumed since the last frame boundary that were thrown away
    noise: usize,
    max_noise: usize,
    stats: ReaderStats,
}

impl FrameReader {
    /// Create a reader for `protocol`
    ///
    /// `max_noise` bounds how many bytes may be consumed without forming a
    /// frame before the buffer is declared stale. It is raised to at least
    /// one frame length.
    pub fn new(protocol: &'static ProtocolVariant, max_noise: usize) -> Self {
        debug_assert!(protocol.frame_len <= MAX_FRAME_SIZE);
        Self {
            protocol,
            buffer: Vec::new(),
            noise: 0,
            max_noise: max_noise.max(protocol.frame_len),
            stats: ReaderStats::default(),
        }
    }

    /// Variant this reader frames for
    pub fn protocol(&self) -> &'static ProtocolVariant {
        self.protocol
    }

    /// Whether a partial frame is buffered
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Number of buffered bytes
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Drop any buffered bytes
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.noise = 0;
    }

    /// Feed a single byte
    ///
    /// Returns a frame when this byte completes one, valid or not. A frame
    /// that fails validation is rescanned from its second byte, so a
    /// header swallowed by a short frame is still found.
    pub fn push(&mut self, byte: u8, now_ms: u32) -> Option<Frame> {
        self.push_checked(byte, now_ms).map(|(frame, _)| frame)
    }

    /// Drain every byte the transport holds right now
    ///
    /// Never blocks. A transport error ends the drain and is treated as
    /// "nothing more available". When several complete frames arrive in one
    /// drain, the newest valid one is returned; a rejected frame is only
    /// returned when none of them validate.
    pub fn poll_once<R: UartRx>(&mut self, rx: &mut R, now_ms: u32) -> ReadOutcome {
        let mut remaining = rx.bytes_available();
        let mut latest: Option<Frame> = None;
        let mut rejected: Option<Frame> = None;
        let mut chunk = [0u8; DRAIN_CHUNK];

        while remaining > 0 {
            let want = remaining.min(DRAIN_CHUNK);
            let n = match rx.read_available(&mut chunk[..want]) {
                Ok(0) | Err(_) => break,
                Ok(n) => n,
            };
            remaining = remaining.saturating_sub(n);
            self.stats.bytes_read = self.stats.bytes_read.wrapping_add(n as u32);

            for &byte in &chunk[..n] {
                match self.push_checked(byte, now_ms) {
                    Some((frame, true)) => {
                        if latest.replace(frame).is_some() {
                            self.stats.superseded = self.stats.superseded.wrapping_add(1);
                        }
                    }
                    Some((frame, false)) => rejected = Some(frame),
                    None => {}
                }
            }
        }

        if let Some(frame) = latest.or(rejected) {
            return ReadOutcome::Complete(frame);
        }

        let consumed = self.noise + self.buffer.len();
        if consumed > self.max_noise {
            self.reset();
            self.stats.stale_resets = self.stats.stale_resets.wrapping_add(1);
            return ReadOutcome::Stale {
                discarded: consumed,
            };
        }

        ReadOutcome::Incomplete {
            buffered: self.buffer.len(),
        }
    }

    /// Feed a byte; a completed frame comes back with its validation result
    fn push_checked(&mut self, byte: u8, now_ms: u32) -> Option<(Frame, bool)> {
        if !self.align(byte) {
            return None;
        }

        // Cannot overflow: the buffer is emptied as soon as it reaches frame_len
        let _ = self.buffer.push(byte);

        if self.buffer.len() < self.protocol.frame_len {
            return None;
        }

        let frame = Frame {
            bytes: core::mem::take(&mut self.buffer),
            received_at_ms: now_ms,
        };
        self.noise = 0;
        self.stats.frames = self.stats.frames.wrapping_add(1);

        let valid = validate(self.protocol, &frame.bytes).is_ok();
        if !valid {
            self.stats.rejected = self.stats.rejected.wrapping_add(1);
            // Fewer than frame_len bytes, so this cannot complete another frame
            for &b in &frame.bytes[1..] {
                if self.align(b) {
                    let _ = self.buffer.push(b);
                }
            }
        }

        Some((frame, valid))
    }

    /// Header hunting: whether `byte` belongs in the buffer
    fn align(&mut self, byte: u8) -> bool {
        let header = self.protocol.header;
        let pos = self.buffer.len();

        if pos < header.len() && byte != header[pos] {
            // Lost sync: drop the partial header and see if this byte starts a new one
            self.discard(pos);
            self.buffer.clear();
            if byte != header[0] {
                self.discard(1);
                return false;
            }
        }
        true
    }

    fn discard(&mut self, count: usize) {
        self.noise += count;
        self.stats.noise_bytes = self.stats.noise_bytes.wrapping_add(count as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::M702;

    /// Transport that hands out a fixed script of bytes
    struct Script<'a> {
        data: &'a [u8],
        pos: usize,
    }

    impl<'a> Script<'a> {
        fn new(data: &'a [u8]) -> Self {
            Self { data, pos: 0 }
        }
    }

    impl UartRx for Script<'_> {
        type Error = ();

        fn bytes_available(&mut self) -> usize {
            self.data.len() - self.pos
        }

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Transport whose reads always fail
    struct Broken;

    impl UartRx for Broken {
        type Error = ();

        fn bytes_available(&mut self) -> usize {
            8
        }

        fn read_available(&mut self, _buf: &mut [u8]) -> Result<usize, ()> {
            Err(())
        }
    }

    fn m702_frame() -> [u8; 17] {
        let mut f = [
            0x3C, 0x02, 0x01, 0x90, 0x00, 0x0A, 0x00, 0x64, 0x00, 0x0C, 0x00, 0x14, 0x17, 0x32,
            0x30, 0x05, 0x00,
        ];
        M702.checksum.write(&mut f);
        f
    }

    #[test]
    fn test_complete_frame_in_one_poll() {
        let bytes = m702_frame();
        let mut rx = Script::new(&bytes);
        let mut reader = FrameReader::new(&M702, 68);

        match reader.poll_once(&mut rx, 1000) {
            ReadOutcome::Complete(frame) => {
                assert_eq!(frame.as_bytes(), &bytes[..]);
                assert_eq!(frame.received_at_ms(), 1000);
            }
            other => panic!("expected complete frame, got {:?}", other),
        }
        assert!(!reader.has_partial());
    }

    #[test]
    fn test_partial_frame_is_kept() {
        let bytes = m702_frame();
        let mut reader = FrameReader::new(&M702, 68);

        let mut first = Script::new(&bytes[..9]);
        assert_eq!(
            reader.poll_once(&mut first, 0),
            ReadOutcome::Incomplete { buffered: 9 }
        );
        assert!(reader.has_partial());

        let mut second = Script::new(&bytes[9..]);
        assert!(matches!(
            reader.poll_once(&mut second, 100),
            ReadOutcome::Complete(_)
        ));
    }

    #[test]
    fn test_resync_after_garbage() {
        let frame = m702_frame();
        let mut data = Vec::<u8, 32>::new();
        data.extend_from_slice(&[0x00, 0x3C, 0x3C, 0xFF]).unwrap();
        data.extend_from_slice(&frame).unwrap();

        let mut rx = Script::new(&data);
        let mut reader = FrameReader::new(&M702, 68);

        match reader.poll_once(&mut rx, 0) {
            ReadOutcome::Complete(f) => assert_eq!(f.as_bytes(), &frame[..]),
            other => panic!("expected complete frame, got {:?}", other),
        }
        assert_eq!(reader.stats().noise_bytes, 4);
    }

    #[test]
    fn test_repeated_header_byte_restarts_frame() {
        // 3C 3C 02 ...: the second 3C begins the real frame
        let frame = m702_frame();
        let mut reader = FrameReader::new(&M702, 68);
        assert!(reader.push(0x3C, 0).is_none());
        let mut out = None;
        for &b in &frame {
            out = reader.push(b, 0);
        }
        assert_eq!(out.map(|f| f.len()), Some(17));
    }

    #[test]
    fn test_newest_frame_wins() {
        let a = m702_frame();
        let mut b = a;
        b[3] = 0x91;
        M702.checksum.write(&mut b);

        let mut data = Vec::<u8, 64>::new();
        data.extend_from_slice(&a).unwrap();
        data.extend_from_slice(&b).unwrap();

        let mut rx = Script::new(&data);
        let mut reader = FrameReader::new(&M702, 68);
        match reader.poll_once(&mut rx, 0) {
            ReadOutcome::Complete(f) => assert_eq!(f.as_bytes(), &b[..]),
            other => panic!("expected complete frame, got {:?}", other),
        }
        assert_eq!(reader.stats().superseded, 1);
    }

    #[test]
    fn test_valid_frame_beats_newer_rejected_one() {
        let good = m702_frame();
        let mut bad = good;
        bad[16] ^= 0x01;

        let mut data = Vec::<u8, 64>::new();
        data.extend_from_slice(&good).unwrap();
        data.extend_from_slice(&bad).unwrap();

        let mut rx = Script::new(&data);
        let mut reader = FrameReader::new(&M702, 68);
        match reader.poll_once(&mut rx, 0) {
            ReadOutcome::Complete(f) => assert_eq!(f.as_bytes(), &good[..]),
            other => panic!("expected complete frame, got {:?}", other),
        }
        assert_eq!(reader.stats().rejected, 1);
        assert_eq!(reader.stats().superseded, 0);
    }

    #[test]
    fn test_rejected_frame_returned_when_nothing_validates() {
        let mut bad = m702_frame();
        bad[16] ^= 0x01;

        let mut rx = Script::new(&bad);
        let mut reader = FrameReader::new(&M702, 68);
        match reader.poll_once(&mut rx, 0) {
            ReadOutcome::Complete(f) => assert_eq!(f.as_bytes(), &bad[..]),
            other => panic!("expected complete frame, got {:?}", other),
        }
    }

    #[test]
    fn test_short_frame_does_not_swallow_next_header() {
        let good = m702_frame();
        let mut data = Vec::<u8, 64>::new();
        // Same frame with one byte lost on the wire
        data.extend_from_slice(&good[..5]).unwrap();
        data.extend_from_slice(&good[6..]).unwrap();
        data.extend_from_slice(&good).unwrap();

        let mut rx = Script::new(&data);
        let mut reader = FrameReader::new(&M702, 68);
        match reader.poll_once(&mut rx, 0) {
            ReadOutcome::Complete(f) => assert_eq!(f.as_bytes(), &good[..]),
            other => panic!("expected complete frame, got {:?}", other),
        }
        assert_eq!(reader.stats().frames, 2);
        assert_eq!(reader.stats().rejected, 1);
        assert!(!reader.has_partial());
    }

    #[test]
    fn test_stale_guard_resets() {
        let noise = [0x55u8; 40];
        let mut rx = Script::new(&noise);
        let mut reader = FrameReader::new(&M702, 34);

        assert_eq!(
            reader.poll_once(&mut rx, 0),
            ReadOutcome::Stale { discarded: 40 }
        );
        assert_eq!(reader.buffered(), 0);
        assert_eq!(reader.stats().stale_resets, 1);
    }

    #[test]
    fn test_transport_error_is_zero_bytes() {
        let mut reader = FrameReader::new(&M702, 68);
        assert_eq!(
            reader.poll_once(&mut Broken, 0),
            ReadOutcome::Incomplete { buffered: 0 }
        );
    }

    #[test]
    fn test_max_noise_at_least_one_frame() {
        let reader = FrameReader::new(&M702, 1);
        assert_eq!(reader.max_noise, M702.frame_len);
    }
}
