//! Bounded APDU Buffer Module
//!
//! [`ApduBuffer`] accumulates the payloads of received segments until an APDU
//! is complete. It never grows past the capacity it was created with; an
//! append that would exceed it is refused and leaves the contents untouched.

#[cfg(feature = "std")]
use std::error::Error;

#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

use bytes::{Bytes, BytesMut};

/// Error returned when an append would exceed the buffer capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOverflow {
    /// Bytes the caller tried to append
    pub requested: usize,
    /// Bytes that were still available
    pub remaining: usize,
}

impl fmt::Display for BufferOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buffer overflow: {} bytes requested, {} remaining",
            self.requested, self.remaining
        )
    }
}

#[cfg(feature = "std")]
impl Error for BufferOverflow {}

/// Growable byte buffer bounded by a fixed capacity
#[derive(Debug)]
pub struct ApduBuffer {
    data: BytesMut,
    capacity: usize,
}

impl ApduBuffer {
    /// Create an empty buffer that holds at most `capacity` bytes
    pub fn new(capacity: usize) -> Self {
        Self {
            data: BytesMut::new(),
            capacity,
        }
    }

    /// Maximum number of bytes the buffer accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bytes currently held
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no bytes
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes that can still be appended
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.data.len())
    }

    /// Append `bytes`, or refuse without modifying the buffer
    pub fn try_extend(&mut self, bytes: &[u8]) -> Result<(), BufferOverflow> {
        if bytes.len() > self.remaining() {
            return Err(BufferOverflow {
                requested: bytes.len(),
                remaining: self.remaining(),
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Discard the contents
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Hand the contents out as an immutable APDU, leaving the buffer empty
    pub fn take(&mut self) -> Bytes {
        self.data.split().freeze()
    }

    /// View the current contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_within_capacity() {
        let mut buffer = ApduBuffer::new(4);
        buffer.try_extend(&[1, 2]).unwrap();
        buffer.try_extend(&[3, 4]).unwrap();
        assert_eq!(buffer.as_slice(), &[1, 2, 3, 4]);
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_overflow_leaves_contents() {
        let mut buffer = ApduBuffer::new(4);
        buffer.try_extend(&[1, 2, 3]).unwrap();

        let err = buffer.try_extend(&[4, 5]).unwrap_err();
        assert_eq!(
            err,
            BufferOverflow {
                requested: 2,
                remaining: 1
            }
        );
        assert_eq!(buffer.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_take_empties_buffer() {
        let mut buffer = ApduBuffer::new(8);
        buffer.try_extend(&[0xAA, 0xBB]).unwrap();

        let apdu = buffer.take();
        assert_eq!(&apdu[..], &[0xAA, 0xBB]);
        assert!(buffer.is_empty());
        assert_eq!(buffer.remaining(), 8);

        // the buffer is reusable after handing out its contents
        buffer.try_extend(&[0xCC]).unwrap();
        assert_eq!(buffer.as_slice(), &[0xCC]);
        assert_eq!(&apdu[..], &[0xAA, 0xBB]);
    }

    #[test]
    fn test_zero_length_extend() {
        let mut buffer = ApduBuffer::new(0);
        buffer.try_extend(&[]).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.try_extend(&[1]).is_err());
    }
}
