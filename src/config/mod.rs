//! Transport Configuration Module
//!
//! Sizes that bound the transport function. Both are fixed for the lifetime of
//! a [`TransportLayer`](crate::transport::TransportLayer) and survive link
//! up/down transitions.
//!
//! # Example
//!
//! ```
//! use dnp3_transport::config::TransportConfig;
//!
//! let config = TransportConfig::from_link_frame_size(250);
//! assert_eq!(config.max_segment_payload, 249);
//! assert!(config.validate().is_ok());
//! ```

#[cfg(feature = "std")]
use std::error::Error;

#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

use crate::segment::TransportHeader;
use crate::{DEFAULT_MAX_APDU_SIZE, MAX_SEGMENT_PAYLOAD};

/// Result type for configuration validation
pub type Result<T> = core::result::Result<T, ConfigError>;

/// Invalid configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `max_apdu_size` was zero
    ZeroApduSize,
    /// `max_segment_payload` was zero
    ZeroSegmentPayload,
    /// `max_segment_payload` does not fit in a link frame
    SegmentPayloadTooLarge(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroApduSize => write!(f, "Maximum APDU size must be non-zero"),
            ConfigError::ZeroSegmentPayload => {
                write!(f, "Maximum segment payload must be non-zero")
            }
            ConfigError::SegmentPayloadTooLarge(size) => write!(
                f,
                "Maximum segment payload {} exceeds link capacity of {} bytes",
                size, MAX_SEGMENT_PAYLOAD
            ),
        }
    }
}

#[cfg(feature = "std")]
impl Error for ConfigError {}

/// Transport layer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransportConfig {
    /// Largest APDU that may be sent or reassembled
    pub max_apdu_size: usize,
    /// Largest payload carried by one segment
    pub max_segment_payload: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_apdu_size: DEFAULT_MAX_APDU_SIZE,
            max_segment_payload: MAX_SEGMENT_PAYLOAD,
        }
    }
}

impl TransportConfig {
    /// Create a configuration with explicit sizes
    pub fn new(max_apdu_size: usize, max_segment_payload: usize) -> Self {
        Self {
            max_apdu_size,
            max_segment_payload,
        }
    }

    /// Derive the segment payload size from the link layer's user data capacity.
    ///
    /// One byte of every link frame is taken by the transport header.
    pub fn from_link_frame_size(frame_user_data: usize) -> Self {
        Self {
            max_segment_payload: frame_user_data.saturating_sub(TransportHeader::SIZE),
            ..Self::default()
        }
    }

    /// Set the maximum APDU size
    pub fn with_max_apdu_size(mut self, max_apdu_size: usize) -> Self {
        self.max_apdu_size = max_apdu_size;
        self
    }

    /// Check that the sizes describe a usable transport
    pub fn validate(&self) -> Result<()> {
        if self.max_apdu_size == 0 {
            return Err(ConfigError::ZeroApduSize);
        }
        if self.max_segment_payload == 0 {
            return Err(ConfigError::ZeroSegmentPayload);
        }
        if self.max_segment_payload > MAX_SEGMENT_PAYLOAD {
            return Err(ConfigError::SegmentPayloadTooLarge(self.max_segment_payload));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.max_apdu_size, 2048);
        assert_eq!(config.max_segment_payload, 249);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_link_frame_size() {
        let config = TransportConfig::from_link_frame_size(3);
        assert_eq!(config.max_segment_payload, 2);
        assert_eq!(config.max_apdu_size, DEFAULT_MAX_APDU_SIZE);

        let config = TransportConfig::from_link_frame_size(1);
        assert_eq!(config.validate(), Err(ConfigError::ZeroSegmentPayload));
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        assert_eq!(
            TransportConfig::new(0, 10).validate(),
            Err(ConfigError::ZeroApduSize)
        );
        assert_eq!(
            TransportConfig::new(10, 0).validate(),
            Err(ConfigError::ZeroSegmentPayload)
        );
        assert_eq!(
            TransportConfig::new(4096, 250).validate(),
            Err(ConfigError::SegmentPayloadTooLarge(250))
        );
        assert!(TransportConfig::new(1, 1).validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = TransportConfig::default().with_max_apdu_size(4096);
        assert_eq!(config.max_apdu_size, 4096);
        assert_eq!(config.max_segment_payload, MAX_SEGMENT_PAYLOAD);
    }
}
