//! Error types for optbyte-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
///
/// All variants are fatal to the invocation that produced them. Every error
/// path restores the store's lock state before the error is returned, so a
/// failed invocation never leaves the non-volatile store writable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The main flash store could not be unlocked (key sequence rejected)
    MainUnlockFailed,
    /// The option-byte region could not be unlocked; the main store was
    /// relocked before this was returned
    OptionUnlockFailed,
    /// The programming cycle never cleared its busy flag within the
    /// configured poll bound; the store was fully relocked
    ProgramTimeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MainUnlockFailed => write!(f, "failed to unlock main flash store"),
            Self::OptionUnlockFailed => write!(f, "failed to unlock option-byte region"),
            Self::ProgramTimeout => write!(f, "option-byte programming timed out"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
