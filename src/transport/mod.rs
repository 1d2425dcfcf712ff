//! DNP3 Transport Layer Module
//!
//! This module provides the transport function that sits between the DNP3
//! application layer and the link layer. The link layer can only carry small
//! frames, so the transport function splits each outgoing APDU into segments
//! and rebuilds incoming APDUs from the segments it receives.
//!
//! # Overview
//!
//! [`TransportLayer`] is the single entry point for both neighbours:
//! - The application layer calls [`TransportLayer::send`] and is notified
//!   through its [`UpperLayer`] implementation.
//! - The link layer calls [`TransportLayer::on_receive`],
//!   [`TransportLayer::on_send_result`], [`TransportLayer::on_lower_layer_up`]
//!   and [`TransportLayer::on_lower_layer_down`], and transmits segments
//!   through its [`LowerLayer`] implementation.
//!
//! # Execution Model
//!
//! Every entry point must be called from one execution context, one call at a
//! time. Nothing blocks: `send` emits the first segment and returns; each
//! following segment is emitted from the `on_send_result` call that confirms
//! the previous one. Only one APDU may be in flight at a time.
//!
//! # Contract Violations
//!
//! Calls made in a state where a correct integration can never make them
//! (sending while offline or while a send is pending, receiving while offline,
//! a send result with nothing in flight, duplicate up/down notifications)
//! panic. [`TransportLayer::try_send`] is available for callers that would
//! rather check than crash.
//!
//! Protocol violations in received data are not errors: the affected segments
//! are dropped, logged, and counted in [`TransportStatistics`].
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use dnp3_transport::config::TransportConfig;
//! use dnp3_transport::logging::Logger;
//! use dnp3_transport::transport::{LowerLayer, TransportLayer, UpperLayer};
//!
//! #[derive(Default)]
//! struct App {
//!     completed: Vec<bool>,
//! }
//!
//! impl UpperLayer for App {
//!     fn on_receive(&mut self, _apdu: Bytes) {}
//!     fn on_send_result(&mut self, success: bool) {
//!         self.completed.push(success);
//!     }
//!     fn on_lower_layer_up(&mut self) {}
//!     fn on_lower_layer_down(&mut self) {}
//! }
//!
//! #[derive(Default)]
//! struct Link {
//!     frames: Vec<Bytes>,
//! }
//!
//! impl LowerLayer for Link {
//!     fn send(&mut self, segment: Bytes) {
//!         self.frames.push(segment);
//!     }
//! }
//!
//! let mut transport = TransportLayer::new(
//!     Logger::new("outstation"),
//!     TransportConfig::default(),
//!     App::default(),
//!     Link::default(),
//! )
//! .unwrap();
//!
//! transport.on_lower_layer_up();
//! transport.send(vec![0xC0u8, 0x81, 0x00, 0x00]);
//! assert_eq!(&transport.lower().frames[0][..], &[0xC0, 0xC0, 0x81, 0x00, 0x00]);
//!
//! transport.on_send_result(true);
//! assert_eq!(transport.upper().completed, vec![true]);
//! ```

#[cfg(feature = "std")]
use std::error::Error;

#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

use bytes::Bytes;

use crate::config::{ConfigError, TransportConfig};
use crate::logging::Logger;
use crate::reassembly::{DiscardReason, Reassembler, RxOutcome};
use crate::segment::Segment;
use crate::segmentation::{Segmenter, TxProgress};
use crate::util::statistics::TransportStatistics;

pub mod link_state;

pub use link_state::{LinkState, LinkStateError};

/// Result type for send operations
pub type Result<T> = core::result::Result<T, SendError>;

/// Reasons an APDU cannot be accepted for transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The link layer is down
    Offline,
    /// A previous APDU is still being transmitted
    SendInProgress,
    /// The APDU is larger than the configured maximum
    ApduTooLarge {
        /// Size of the rejected APDU
        size: usize,
        /// Configured maximum APDU size
        max: usize,
    },
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Offline => write!(f, "Transport layer is offline"),
            SendError::SendInProgress => write!(f, "A send is already in progress"),
            SendError::ApduTooLarge { size, max } => {
                write!(f, "APDU of {} bytes exceeds maximum of {}", size, max)
            }
        }
    }
}

#[cfg(feature = "std")]
impl Error for SendError {}

/// Interface of the layer above the transport function (the application layer)
pub trait UpperLayer {
    /// A complete APDU was reassembled
    fn on_receive(&mut self, apdu: Bytes);

    /// The APDU passed to [`TransportLayer::send`] was fully sent, or failed.
    ///
    /// Not called for a send cancelled by the link going down.
    fn on_send_result(&mut self, success: bool);

    /// The link layer came up
    fn on_lower_layer_up(&mut self);

    /// The link layer went down
    fn on_lower_layer_down(&mut self);
}

/// Interface of the layer below the transport function (the link layer)
pub trait LowerLayer {
    /// Transmit exactly one encoded segment.
    ///
    /// The outcome must later be reported through
    /// [`TransportLayer::on_send_result`].
    fn send(&mut self, segment: Bytes);
}

/// The DNP3 transport function.
///
/// Owns the transmit path ([`Segmenter`]), the receive path ([`Reassembler`]),
/// the link-state gate, and the two neighbouring layers it talks to.
#[derive(Debug)]
pub struct TransportLayer<U, L> {
    logger: Logger,
    config: TransportConfig,
    state: LinkState,
    segmenter: Segmenter,
    reassembler: Reassembler,
    stats: TransportStatistics,
    upper: U,
    lower: L,
}

impl<U: UpperLayer, L: LowerLayer> TransportLayer<U, L> {
    /// Create a transport layer in the `Offline` state
    pub fn new(
        logger: Logger,
        config: TransportConfig,
        upper: U,
        lower: L,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            logger,
            config,
            state: LinkState::Offline,
            segmenter: Segmenter::new(config.max_segment_payload),
            reassembler: Reassembler::new(config.max_apdu_size),
            stats: TransportStatistics::new(),
            upper,
            lower,
        })
    }

    // ---- upper-layer interface ----

    /// Start transmitting an APDU.
    ///
    /// Panics if the layer is offline, a send is already in flight, or the APDU
    /// exceeds the maximum size. See [`TransportLayer::try_send`].
    pub fn send(&mut self, apdu: impl Into<Bytes>) {
        if let Err(err) = self.try_send(apdu) {
            panic!("transport send contract violated: {}", err);
        }
    }

    /// Start transmitting an APDU, or report why it cannot be sent now
    pub fn try_send(&mut self, apdu: impl Into<Bytes>) -> Result<()> {
        let apdu = apdu.into();

        if !self.state.is_online() {
            return Err(SendError::Offline);
        }
        if self.segmenter.is_sending() {
            return Err(SendError::SendInProgress);
        }
        if apdu.len() > self.config.max_apdu_size {
            return Err(SendError::ApduTooLarge {
                size: apdu.len(),
                max: self.config.max_apdu_size,
            });
        }

        let segment = self.segmenter.begin(apdu);
        self.transmit(segment);
        Ok(())
    }

    // ---- lower-layer interface ----

    /// A segment arrived from the link layer.
    ///
    /// Panics if the layer is offline.
    pub fn on_receive(&mut self, data: Bytes) {
        assert!(
            self.state.is_online(),
            "transport received a segment while offline"
        );
        self.stats.rx_segments += 1;

        let segment = match Segment::decode(&data) {
            Ok(segment) => segment,
            Err(err) => {
                self.stats.rx_malformed += 1;
                self.logger.warn(format_args!("{}", err));
                return;
            }
        };
        self.logger.segment("RX", &segment);

        if segment.header.fir() && self.reassembler.is_assembling() {
            self.stats.rx_interrupted += 1;
            self.logger.warn(format_args!(
                "FIR received mid-APDU, discarding {} buffered bytes",
                self.reassembler.buffered_len()
            ));
        }

        match self.reassembler.on_segment(&segment) {
            RxOutcome::Complete(apdu) => {
                self.stats.rx_apdus += 1;
                self.upper.on_receive(apdu);
            }
            RxOutcome::Partial => {}
            RxOutcome::Ignored => {
                self.stats.rx_ignored += 1;
                self.logger.debug(format_args!(
                    "Ignoring non-FIR segment ({}) with no APDU in progress",
                    segment.header
                ));
            }
            RxOutcome::Discarded(reason) => {
                match reason {
                    DiscardReason::BadSequence { .. } => self.stats.rx_bad_sequence += 1,
                    DiscardReason::Overflow { .. } => self.stats.rx_overflow += 1,
                }
                self.logger
                    .warn(format_args!("Discarding partial APDU: {}", reason));
            }
        }
    }

    /// The link layer finished transmitting the last segment handed to it.
    ///
    /// Panics if no send is in flight.
    pub fn on_send_result(&mut self, success: bool) {
        assert!(
            self.segmenter.is_sending(),
            "transport received a send result with no send in flight"
        );

        match self.segmenter.on_send_result(success) {
            TxProgress::Segment(segment) => self.transmit(segment),
            TxProgress::Complete => {
                self.stats.tx_apdus += 1;
                self.upper.on_send_result(true);
            }
            TxProgress::Failed => {
                self.stats.tx_failures += 1;
                self.logger
                    .warn(format_args!("Link failed to send segment, aborting APDU"));
                self.upper.on_send_result(false);
            }
        }
    }

    /// The link layer came up.
    ///
    /// Panics if already online.
    pub fn on_lower_layer_up(&mut self) {
        if let Err(err) = self.state.go_online() {
            panic!("{}", err);
        }
        self.segmenter.reset();
        self.reassembler.reset();
        self.logger.debug(format_args!("Lower layer up"));
        self.upper.on_lower_layer_up();
    }

    /// The link layer went down.
    ///
    /// Cancels any send in flight without reporting its outcome and drops any
    /// partial APDU. Panics if already offline.
    pub fn on_lower_layer_down(&mut self) {
        if let Err(err) = self.state.go_offline() {
            panic!("{}", err);
        }
        if self.segmenter.abort() {
            self.stats.tx_aborted += 1;
            self.logger
                .debug(format_args!("Send cancelled by lower layer down"));
        }
        if self.reassembler.reset() {
            self.logger
                .debug(format_args!("Partial APDU dropped by lower layer down"));
        }
        self.logger.debug(format_args!("Lower layer down"));
        self.upper.on_lower_layer_down();
    }

    // ---- introspection ----

    /// Check if the link below is up
    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.state
    }

    /// Check if an APDU is being transmitted
    pub fn is_sending(&self) -> bool {
        self.segmenter.is_sending()
    }

    /// Check if an APDU is being reassembled
    pub fn is_reassembling(&self) -> bool {
        self.reassembler.is_assembling()
    }

    /// Configuration this layer was built with
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn statistics(&self) -> &TransportStatistics {
        &self.stats
    }

    pub fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    pub fn upper(&self) -> &U {
        &self.upper
    }

    pub fn upper_mut(&mut self) -> &mut U {
        &mut self.upper
    }

    pub fn lower(&self) -> &L {
        &self.lower
    }

    pub fn lower_mut(&mut self) -> &mut L {
        &mut self.lower
    }

    /// Consume the layer, returning its neighbours
    pub fn into_parts(self) -> (U, L) {
        (self.upper, self.lower)
    }

    fn transmit(&mut self, segment: Segment) {
        self.logger.segment("TX", &segment);
        self.stats.tx_segments += 1;
        self.lower.send(segment.encode());
    }
}
