//! Logging Capability
//!
//! The transport layer does not log through a global prefix of its own. It is
//! handed a [`Logger`] at construction, which tags every record with the id of
//! the station it belongs to and applies a per-instance level filter on top of
//! whatever the `log` backend allows.
//!
//! # Example
//!
//! ```
//! use dnp3_transport::logging::Logger;
//! use log::LevelFilter;
//!
//! let logger = Logger::new("outstation-1").with_level(LevelFilter::Debug);
//! assert_eq!(logger.id(), "outstation-1");
//! ```

#[cfg(not(feature = "std"))]
use alloc::string::String;

use core::fmt;

use log::{Level, LevelFilter};

use crate::segment::Segment;
use crate::util::hex_dump;

/// Log target used for every record emitted by this crate
pub const LOG_TARGET: &str = "dnp3_transport";

/// Per-instance logging handle
#[derive(Debug, Clone)]
pub struct Logger {
    id: String,
    level: LevelFilter,
}

impl Logger {
    /// Create a logger for the station `id`, passing every level through
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level: LevelFilter::Trace,
        }
    }

    /// Restrict this instance to records at or above `level`
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Station id prefixed to every record
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Level filter of this instance
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Check if a record at `level` would be emitted
    pub fn enabled(&self, level: Level) -> bool {
        level <= self.level && log::log_enabled!(target: LOG_TARGET, level)
    }

    /// Emit a record
    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            log::log!(target: LOG_TARGET, level, "{} - {}", self.id, args);
        }
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    /// Trace a segment crossing the link interface.
    ///
    /// The payload dump is only formatted when trace output is enabled.
    pub fn segment(&self, direction: &str, segment: &Segment) {
        if !self.enabled(Level::Trace) {
            return;
        }
        self.log(
            Level::Trace,
            format_args!(
                "{} {} ({} bytes)",
                direction,
                segment.header,
                segment.payload.len()
            ),
        );
        if !segment.payload.is_empty() {
            self.log(
                Level::Trace,
                format_args!("\n{}", hex_dump(&segment.payload, "    ").trim_end()),
            );
        }
    }
}
