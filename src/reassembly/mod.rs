//! Receive Path: APDU Reassembly
//!
//! The [`Reassembler`] consumes segments in the order the link layer delivers
//! them and rebuilds the APDU they carry.
//!
//! # Rules
//!
//! Each segment is evaluated against these rules, first match wins:
//!
//! 1. **FIR set**: any partial APDU is dropped and a new one is started with
//!    this payload. If FIN is also set the APDU is complete.
//! 2. **FIR clear, nothing in progress**: the segment is ignored.
//! 3. **FIR clear, next sequence number, fits in the buffer**: the payload is
//!    appended. If FIN is set the APDU is complete.
//! 4. **Anything else** (sequence gap or overflow): the partial APDU and the
//!    segment are both dropped. Reassembly resumes at the next FIR.
//!
//! None of these outcomes is an error for the caller. A gap on a lossy link
//! simply loses the APDU in flight.

#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

use bytes::Bytes;

use crate::buffer::ApduBuffer;
use crate::segment::{Segment, Sequence};

/// Why a partial APDU was thrown away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The segment did not carry the next sequence number
    BadSequence {
        /// Sequence number that would have continued the APDU
        expected: Sequence,
        /// Sequence number actually received
        received: Sequence,
    },
    /// Appending the payload would exceed the maximum APDU size
    Overflow {
        /// Size the APDU would have reached
        size: usize,
        /// Maximum APDU size
        max: usize,
    },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::BadSequence { expected, received } => write!(
                f,
                "bad sequence number, expected {} but received {}",
                expected, received
            ),
            DiscardReason::Overflow { size, max } => {
                write!(f, "APDU of {} bytes exceeds maximum of {}", size, max)
            }
        }
    }
}

/// Result of feeding one segment to the [`Reassembler`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxOutcome {
    /// The segment completed an APDU
    Complete(Bytes),
    /// The segment was buffered; more are needed
    Partial,
    /// A non-FIR segment arrived with nothing in progress
    Ignored,
    /// The segment and any partial APDU were dropped
    Discarded(DiscardReason),
}

/// Receive half of the transport function
#[derive(Debug)]
pub struct Reassembler {
    buffer: ApduBuffer,
    /// Sequence number of the last accepted segment while an APDU is in progress
    last_seq: Option<Sequence>,
}

impl Reassembler {
    /// Create a reassembler for APDUs of at most `max_apdu_size` bytes
    pub fn new(max_apdu_size: usize) -> Self {
        Self {
            buffer: ApduBuffer::new(max_apdu_size),
            last_seq: None,
        }
    }

    /// Check if a partial APDU is being accumulated
    pub fn is_assembling(&self) -> bool {
        self.last_seq.is_some()
    }

    /// Sequence number of the last accepted segment, if assembling
    pub fn last_sequence(&self) -> Option<Sequence> {
        self.last_seq
    }

    /// Bytes accumulated so far
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Process one segment
    pub fn on_segment(&mut self, segment: &Segment) -> RxOutcome {
        let header = segment.header;

        if header.fir() {
            self.reset();
            return self.accept(segment);
        }

        let last = match self.last_seq {
            Some(last) => last,
            None => return RxOutcome::Ignored,
        };

        let expected = last.next();
        if header.seq != expected {
            self.reset();
            return RxOutcome::Discarded(DiscardReason::BadSequence {
                expected,
                received: header.seq,
            });
        }

        self.accept(segment)
    }

    /// Drop any partial APDU.
    ///
    /// Returns `true` if a reassembly was in progress.
    pub fn reset(&mut self) -> bool {
        self.buffer.clear();
        self.last_seq.take().is_some()
    }

    fn accept(&mut self, segment: &Segment) -> RxOutcome {
        if self.buffer.try_extend(&segment.payload).is_err() {
            let size = self.buffer.len() + segment.payload.len();
            self.reset();
            return RxOutcome::Discarded(DiscardReason::Overflow {
                size,
                max: self.buffer.capacity(),
            });
        }

        if segment.header.fin() {
            self.last_seq = None;
            RxOutcome::Complete(self.buffer.take())
        } else {
            self.last_seq = Some(segment.header.seq);
            RxOutcome::Partial
        }
    }
}
