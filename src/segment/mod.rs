//! DNP3 Transport Segment Module
//!
//! This module implements the wire representation of a transport segment (TPDU):
//! a single header byte followed by a slice of the APDU being carried.
//!
//! # Wire Format
//!
//! ```text
//!   bit:   7     6     5..0
//!        +-----+-----+-----------+----------------------------+
//!        | FIR | FIN |    SEQ    | payload (0..=249 bytes)    |
//!        +-----+-----+-----------+----------------------------+
//! ```
//!
//! - **FIR**: set on the first segment of an APDU
//! - **FIN**: set on the final segment of an APDU
//! - **SEQ**: 6-bit sequence number, cyclic modulo 64
//!
//! A segment with both FIR and FIN set carries a complete APDU on its own.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use dnp3_transport::segment::{Segment, Sequence, TransportHeader};
//!
//! let header = TransportHeader::new(true, false, Sequence::new(5));
//! let segment = Segment::new(header, Bytes::from_static(&[0xC0, 0x01]));
//! let encoded = segment.encode();
//! assert_eq!(&encoded[..], &[0x85, 0xC0, 0x01]);
//!
//! let decoded = Segment::decode(&encoded).unwrap();
//! assert_eq!(decoded, segment);
//! ```

#[cfg(feature = "std")]
use std::error::Error;

#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

use bitflags::bitflags;
use bytes::{BufMut, Bytes, BytesMut};

/// Result type for segment decoding
pub type Result<T> = core::result::Result<T, SegmentError>;

/// Errors that can occur while decoding a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentError {
    /// The received buffer did not even contain the header byte
    MissingHeader,
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentError::MissingHeader => write!(f, "Segment has no transport header"),
        }
    }
}

#[cfg(feature = "std")]
impl Error for SegmentError {}

/// 6-bit transport sequence number.
///
/// Values are always kept in `0..64`; arithmetic wraps modulo 64.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sequence(u8);

impl Sequence {
    /// Number of distinct sequence values
    pub const MODULUS: u8 = 64;

    /// Bits of the header byte occupied by the sequence number
    pub const MASK: u8 = 0x3F;

    /// Create a sequence number, discarding any bits above the low six
    pub const fn new(value: u8) -> Self {
        Self(value & Self::MASK)
    }

    /// Raw value in `0..64`
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The sequence number that follows this one
    pub const fn next(self) -> Self {
        Self::new(self.0.wrapping_add(1))
    }

    /// Return the current value and advance to the next one
    pub fn increment(&mut self) -> Self {
        let current = *self;
        *self = current.next();
        current
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Flag bits of the transport header
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct HeaderFlags: u8 {
        /// First segment of an APDU
        const FIR = 0x80;
        /// Final segment of an APDU
        const FIN = 0x40;
    }
}

/// One-byte transport header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportHeader {
    /// FIR/FIN flags
    pub flags: HeaderFlags,
    /// Sequence number
    pub seq: Sequence,
}

impl TransportHeader {
    /// Encoded size of the header in bytes
    pub const SIZE: usize = 1;

    /// Create a header from its individual fields
    pub fn new(fir: bool, fin: bool, seq: Sequence) -> Self {
        let mut flags = HeaderFlags::empty();
        flags.set(HeaderFlags::FIR, fir);
        flags.set(HeaderFlags::FIN, fin);
        Self { flags, seq }
    }

    /// Check if the FIR bit is set
    pub fn fir(&self) -> bool {
        self.flags.contains(HeaderFlags::FIR)
    }

    /// Check if the FIN bit is set
    pub fn fin(&self) -> bool {
        self.flags.contains(HeaderFlags::FIN)
    }

    /// Check if this header marks a complete single-segment APDU
    pub fn is_single_segment(&self) -> bool {
        self.flags.contains(HeaderFlags::FIR | HeaderFlags::FIN)
    }

    /// Encode to the wire byte
    pub fn to_byte(&self) -> u8 {
        self.flags.bits() | self.seq.value()
    }

    /// Decode from the wire byte. Every byte value is a valid header.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            flags: HeaderFlags::from_bits_truncate(byte),
            seq: Sequence::new(byte),
        }
    }
}

impl fmt::Display for TransportHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FIR: {} FIN: {} SEQ: {}",
            u8::from(self.fir()),
            u8::from(self.fin()),
            self.seq
        )
    }
}

/// A transport segment: header plus payload.
///
/// The payload is a [`Bytes`] handle, so segments produced from an APDU and
/// segments decoded from a received frame share the underlying storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Transport header
    pub header: TransportHeader,
    /// User data carried by this segment
    pub payload: Bytes,
}

impl Segment {
    /// Create a new segment
    pub fn new(header: TransportHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Total number of bytes this segment occupies on the wire
    pub fn encoded_len(&self) -> usize {
        TransportHeader::SIZE + self.payload.len()
    }

    /// Encode the segment for the link layer
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(self.header.to_byte());
        buf.put_slice(&self.payload);
        buf.freeze()
    }

    /// Decode a segment received from the link layer
    pub fn decode(data: &Bytes) -> Result<Self> {
        let first = data.first().ok_or(SegmentError::MissingHeader)?;
        Ok(Self {
            header: TransportHeader::from_byte(*first),
            payload: data.slice(TransportHeader::SIZE..),
        })
    }
}

/// Number of segments needed to carry an APDU of `len` bytes.
///
/// An empty APDU still occupies one segment.
pub fn segment_count(len: usize, max_payload: usize) -> usize {
    if len == 0 {
        1
    } else {
        len.div_ceil(max_payload)
    }
}
