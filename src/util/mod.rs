//! Utility Functions Module
//!
//! Helpers shared by the transport layer:
//! - Hex dumps of segment payloads for trace logging
//! - Transport statistics counters

#[cfg(not(feature = "std"))]
use alloc::string::String;

use core::fmt::Write;

/// Hex dump utility for debugging.
///
/// Prints 16 bytes per line, each line starting with `prefix` and the offset.
pub fn hex_dump(data: &[u8], prefix: &str) -> String {
    let mut result = String::new();

    for (i, chunk) in data.chunks(16).enumerate() {
        let encoded = hex::encode_upper(chunk);
        let _ = write!(result, "{}{:04X}:", prefix, i * 16);
        for pair in encoded.as_bytes().chunks(2) {
            result.push(' ');
            result.push(pair[0] as char);
            result.push(pair[1] as char);
        }
        result.push('\n');
    }

    result
}

/// Statistics collection helpers
pub mod statistics {
    /// Counters kept by the transport layer.
    ///
    /// Every counter only ever increases until [`TransportStatistics::reset`].
    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TransportStatistics {
        /// Segments received from the link layer
        pub rx_segments: u64,
        /// APDUs delivered to the application layer
        pub rx_apdus: u64,
        /// Segments too short to carry a header
        pub rx_malformed: u64,
        /// Non-FIR segments received with no reassembly in progress
        pub rx_ignored: u64,
        /// Partial APDUs dropped on a sequence gap
        pub rx_bad_sequence: u64,
        /// Partial APDUs dropped for exceeding the maximum APDU size
        pub rx_overflow: u64,
        /// Partial APDUs replaced by a new FIR segment
        pub rx_interrupted: u64,
        /// Segments handed to the link layer
        pub tx_segments: u64,
        /// APDUs whose every segment was sent
        pub tx_apdus: u64,
        /// APDUs abandoned after the link failed to send a segment
        pub tx_failures: u64,
        /// APDUs abandoned because the link went down
        pub tx_aborted: u64,
    }

    impl TransportStatistics {
        /// Create new statistics
        pub fn new() -> Self {
            Self::default()
        }

        /// Total segments dropped on the receive path for any reason
        pub fn rx_discarded(&self) -> u64 {
            self.rx_malformed + self.rx_ignored + self.rx_bad_sequence + self.rx_overflow
        }

        /// Reset all statistics
        pub fn reset(&mut self) {
            *self = Self::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::statistics::TransportStatistics;
    use super::*;

    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    #[test]
    fn test_hex_dump() {
        let data: [u8; 18] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D,
            0x0E, 0x0F, 0xAA, 0xBB,
        ];
        let dump = hex_dump(&data, "  ");
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "  0000: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F"
        );
        assert_eq!(lines[1], "  0010: AA BB");
    }

    #[test]
    fn test_hex_dump_empty() {
        assert!(hex_dump(&[], "").is_empty());
    }

    #[test]
    fn test_statistics_reset() {
        let mut stats = TransportStatistics::new();
        stats.rx_ignored = 2;
        stats.rx_bad_sequence = 1;
        stats.tx_segments = 5;
        assert_eq!(stats.rx_discarded(), 3);

        stats.reset();
        assert_eq!(stats, TransportStatistics::default());
    }
}
