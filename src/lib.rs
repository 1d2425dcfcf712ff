#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

pub mod buffer;
pub mod config;
pub mod logging;
pub mod reassembly;
pub mod segment;
pub mod segmentation;
pub mod transport;
pub mod util;

// Re-export main types without glob imports to avoid conflicts
pub use config::{ConfigError, TransportConfig};
pub use logging::Logger;
pub use segment::{Segment, SegmentError, Sequence, TransportHeader};
pub use transport::{LinkState, LowerLayer, SendError, TransportLayer, UpperLayer};
pub use util::statistics::TransportStatistics;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(feature = "std"))]
extern crate alloc;

/// User data capacity of a DNP3 link frame
pub const LINK_MAX_USER_DATA: usize = 250;
/// Largest payload a segment can carry inside one link frame
pub const MAX_SEGMENT_PAYLOAD: usize = LINK_MAX_USER_DATA - segment::TransportHeader::SIZE;
/// Default maximum APDU size
pub const DEFAULT_MAX_APDU_SIZE: usize = 2048;
