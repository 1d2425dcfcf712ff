//! Transmit Path: APDU Segmentation
//!
//! The [`Segmenter`] splits an outgoing APDU into segments and hands them out
//! one at a time. It never has more than one segment outstanding: the next
//! segment is produced only after the link layer has confirmed the previous one
//! through [`Segmenter::on_send_result`].
//!
//! The transmit sequence counter advances once per segment and carries over
//! from one APDU to the next. It is reset only by [`Segmenter::reset`].
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use dnp3_transport::segmentation::{Segmenter, TxProgress};
//!
//! let mut segmenter = Segmenter::new(2);
//! let first = segmenter.begin(Bytes::from_static(&[1, 2, 3]));
//! assert!(first.header.fir() && !first.header.fin());
//!
//! match segmenter.on_send_result(true) {
//!     TxProgress::Segment(last) => assert!(last.header.fin()),
//!     other => panic!("unexpected {:?}", other),
//! }
//! assert_eq!(segmenter.on_send_result(true), TxProgress::Complete);
//! ```

use bytes::Bytes;

use crate::segment::{Segment, Sequence, TransportHeader};

/// What the transmit path does after the link reports a send result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxProgress {
    /// Transmit this segment next
    Segment(Segment),
    /// Every segment of the APDU was sent
    Complete,
    /// The link failed to send a segment and the remainder was dropped
    Failed,
}

/// APDU currently being transmitted
#[derive(Debug)]
struct PendingSend {
    apdu: Bytes,
    /// Bytes of `apdu` already handed to the link layer
    offset: usize,
}

/// Transmit half of the transport function
#[derive(Debug)]
pub struct Segmenter {
    max_payload: usize,
    seq: Sequence,
    pending: Option<PendingSend>,
}

impl Segmenter {
    /// Create a segmenter that puts at most `max_payload` bytes in each segment
    pub fn new(max_payload: usize) -> Self {
        assert!(max_payload > 0, "segment payload size must be non-zero");
        Self {
            max_payload,
            seq: Sequence::default(),
            pending: None,
        }
    }

    /// Check if an APDU is in flight
    pub fn is_sending(&self) -> bool {
        self.pending.is_some()
    }

    /// Sequence number the next transmitted segment will carry
    pub fn next_sequence(&self) -> Sequence {
        self.seq
    }

    /// Start transmitting `apdu` and return its first segment.
    ///
    /// Panics if an APDU is already in flight.
    pub fn begin(&mut self, apdu: Bytes) -> Segment {
        assert!(
            self.pending.is_none(),
            "segmenter already has an APDU in flight"
        );
        let mut pending = PendingSend { apdu, offset: 0 };
        let segment = self.emit(&mut pending);
        self.pending = Some(pending);
        segment
    }

    /// Advance after the link layer reports the outcome of the last segment.
    ///
    /// Panics if no APDU is in flight.
    pub fn on_send_result(&mut self, success: bool) -> TxProgress {
        let mut pending = match self.pending.take() {
            Some(pending) => pending,
            None => panic!("send result reported with no APDU in flight"),
        };

        if !success {
            return TxProgress::Failed;
        }

        if pending.offset >= pending.apdu.len() {
            return TxProgress::Complete;
        }

        let segment = self.emit(&mut pending);
        self.pending = Some(pending);
        TxProgress::Segment(segment)
    }

    /// Drop the APDU in flight without reporting an outcome.
    ///
    /// Returns `true` if something was aborted.
    pub fn abort(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Abort any send and restart the sequence counter at zero
    pub fn reset(&mut self) {
        self.pending = None;
        self.seq = Sequence::default();
    }

    fn emit(&mut self, pending: &mut PendingSend) -> Segment {
        let start = pending.offset;
        let end = pending.apdu.len().min(start + self.max_payload);
        let header = TransportHeader::new(
            start == 0,
            end == pending.apdu.len(),
            self.seq.increment(),
        );
        pending.offset = end;
        Segment::new(header, pending.apdu.slice(start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::{vec, vec::Vec};

    fn drain(segmenter: &mut Segmenter, apdu: &'static [u8]) -> Vec<Segment> {
        let mut segments = vec![segmenter.begin(Bytes::from_static(apdu))];
        while let TxProgress::Segment(next) = segmenter.on_send_result(true) {
            segments.push(next);
        }
        segments
    }

    #[test]
    fn test_five_bytes_two_per_segment() {
        let mut segmenter = Segmenter::new(2);
        let segments = drain(&mut segmenter, &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE]);

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].header, TransportHeader::new(true, false, Sequence::new(0)));
        assert_eq!(&segments[0].payload[..], &[0xAA, 0xBB]);
        assert_eq!(segments[1].header, TransportHeader::new(false, false, Sequence::new(1)));
        assert_eq!(&segments[1].payload[..], &[0xCC, 0xDD]);
        assert_eq!(segments[2].header, TransportHeader::new(false, true, Sequence::new(2)));
        assert_eq!(&segments[2].payload[..], &[0xEE]);
        assert!(!segmenter.is_sending());
    }

    #[test]
    fn test_exact_fit_is_single_segment() {
        let mut segmenter = Segmenter::new(4);
        let segments = drain(&mut segmenter, &[1, 2, 3, 4]);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].header.is_single_segment());
    }

    #[test]
    fn test_one_over_is_two_segments() {
        let mut segmenter = Segmenter::new(4);
        let segments = drain(&mut segmenter, &[1, 2, 3, 4, 5]);
        assert_eq!(segments.len(), 2);
        assert!(segments[0].header.fir() && !segments[0].header.fin());
        assert!(!segments[1].header.fir() && segments[1].header.fin());
        assert_eq!(&segments[1].payload[..], &[5]);
    }

    #[test]
    fn test_empty_apdu() {
        let mut segmenter = Segmenter::new(4);
        let segments = drain(&mut segmenter, &[]);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].header.is_single_segment());
        assert!(segments[0].payload.is_empty());
        assert_eq!(segmenter.next_sequence(), Sequence::new(1));
    }

    #[test]
    fn test_sequence_carries_across_apdus() {
        let mut segmenter = Segmenter::new(1);
        drain(&mut segmenter, &[1, 2, 3]);
        let segments = drain(&mut segmenter, &[4, 5]);
        assert_eq!(segments[0].header.seq, Sequence::new(3));
        assert_eq!(segments[1].header.seq, Sequence::new(4));
    }

    #[test]
    fn test_sequence_wraps_mid_apdu() {
        let mut segmenter = Segmenter::new(1);
        for _ in 0..62 {
            drain(&mut segmenter, &[0]);
        }
        let segments = drain(&mut segmenter, &[1, 2, 3]);
        let seqs: Vec<u8> = segments.iter().map(|s| s.header.seq.value()).collect();
        assert_eq!(seqs, vec![62, 63, 0]);
    }

    #[test]
    fn test_failure_drops_remainder() {
        let mut segmenter = Segmenter::new(1);
        segmenter.begin(Bytes::from_static(&[1, 2, 3]));
        assert!(matches!(segmenter.on_send_result(true), TxProgress::Segment(_)));
        assert_eq!(segmenter.on_send_result(false), TxProgress::Failed);
        assert!(!segmenter.is_sending());
        // the counter still reflects the two segments handed out
        assert_eq!(segmenter.next_sequence(), Sequence::new(2));
    }

    #[test]
    fn test_abort_and_reset() {
        let mut segmenter = Segmenter::new(1);
        segmenter.begin(Bytes::from_static(&[1, 2]));
        assert!(segmenter.abort());
        assert!(!segmenter.abort());

        segmenter.begin(Bytes::from_static(&[1]));
        segmenter.reset();
        assert!(!segmenter.is_sending());
        assert_eq!(segmenter.next_sequence(), Sequence::new(0));
    }

    #[test]
    #[should_panic(expected = "already has an APDU in flight")]
    fn test_begin_while_sending_panics() {
        let mut segmenter = Segmenter::new(1);
        segmenter.begin(Bytes::from_static(&[1, 2]));
        segmenter.begin(Bytes::from_static(&[3]));
    }

    #[test]
    #[should_panic(expected = "no APDU in flight")]
    fn test_result_while_idle_panics() {
        let mut segmenter = Segmenter::new(1);
        segmenter.on_send_result(true);
    }
}
