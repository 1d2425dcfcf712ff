//! Link-state gate.
//!
//! Tracks whether the link layer below is up. Transitions are only legal from
//! the opposite state; anything else is an integration bug.

#[cfg(feature = "std")]
use std::error::Error;

#[cfg(feature = "std")]
use std::fmt;

#[cfg(not(feature = "std"))]
use core::fmt;

/// Illegal link-state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStateError {
    /// Lower layer reported up while already online
    AlreadyOnline,
    /// Lower layer reported down while already offline
    AlreadyOffline,
}

impl fmt::Display for LinkStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkStateError::AlreadyOnline => write!(f, "Lower layer up while already online"),
            LinkStateError::AlreadyOffline => {
                write!(f, "Lower layer down while already offline")
            }
        }
    }
}

#[cfg(feature = "std")]
impl Error for LinkStateError {}

/// State of the link below the transport layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkState {
    /// No link; sends and receives are not allowed
    #[default]
    Offline,
    /// Link is up
    Online,
}

impl LinkState {
    /// Check if the link is up
    pub fn is_online(self) -> bool {
        self == LinkState::Online
    }

    /// Transition `Offline -> Online`
    pub fn go_online(&mut self) -> Result<(), LinkStateError> {
        match self {
            LinkState::Offline => {
                *self = LinkState::Online;
                Ok(())
            }
            LinkState::Online => Err(LinkStateError::AlreadyOnline),
        }
    }

    /// Transition `Online -> Offline`
    pub fn go_offline(&mut self) -> Result<(), LinkStateError> {
        match self {
            LinkState::Online => {
                *self = LinkState::Offline;
                Ok(())
            }
            LinkState::Offline => Err(LinkStateError::AlreadyOffline),
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Offline => write!(f, "Offline"),
            LinkState::Online => write!(f, "Online"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        assert_eq!(LinkState::default(), LinkState::Offline);
        assert!(!LinkState::default().is_online());
    }

    #[test]
    fn test_transitions() {
        let mut state = LinkState::Offline;
        state.go_online().unwrap();
        assert!(state.is_online());
        assert_eq!(state.go_online(), Err(LinkStateError::AlreadyOnline));

        state.go_offline().unwrap();
        assert!(!state.is_online());
        assert_eq!(state.go_offline(), Err(LinkStateError::AlreadyOffline));
    }
}
