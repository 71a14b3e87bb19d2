//! Error handling for the application

use std::time::Duration;
use thiserror::Error;

/// Per-cycle scan errors. None of these are fatal: the cycle is abandoned and
/// the next trigger starts a fresh one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("Venue {venue} unavailable: {reason}")]
    VenueUnavailable { venue: String, reason: String },

    #[error("Gas price query failed: {0}")]
    GasQueryFailed(String),

    #[error("Scan cycle timed out after {0:?}")]
    CycleTimedOut(Duration),
}

impl ScanError {
    pub fn venue_unavailable(venue: impl Into<String>, reason: impl ToString) -> Self {
        ScanError::VenueUnavailable {
            venue: venue.into(),
            reason: reason.to_string(),
        }
    }
}

/// Trigger stream errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StreamError {
    /// Transport dropped; recoverable by reconnecting.
    #[error("Trigger transport error: {0}")]
    Transport(String),

    /// Reconnection gave up. No further triggers can arrive.
    #[error("Trigger stream disconnected after {attempts} reconnect attempts: {last_error}")]
    StreamDisconnected { attempts: u32, last_error: String },
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Blockchain error: {0}")]
    BlockchainError(String),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}
