//! Capability trait for the non-volatile option-byte store
//!
//! The protocol logic in [`crate::mutator`] never touches hardware
//! registers directly. Everything it needs is expressed through
//! [`OptionByteStore`], which maps one-to-one onto the flash peripheral's
//! register-level contract and can be implemented by a simulated store for
//! deterministic testing.

use crate::error::Result;
use crate::register::OptionRegister;

/// Which of the two nested flash locks are currently open
///
/// Option-byte programming is only valid in `MainAndOptionUnlocked`. Any
/// early-exit path must route back to `Locked` before an error propagates,
/// so the non-volatile store is never left writable indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    /// Both the main store and the option region are locked
    Locked,
    /// The main store is unlocked, the option region is still locked
    MainUnlocked,
    /// Both locks are open; option-byte programming is permitted
    MainAndOptionUnlocked,
}

/// Register-level contract of the flash/option-byte peripheral
///
/// All operations are blocking and synchronous. The store is a single
/// global mutable resource with exactly one legitimate writer, invoked once
/// during early single-threaded boot, so implementations do not need to be
/// re-entrant or thread-safe.
pub trait OptionByteStore {
    /// Read the current option register snapshot
    ///
    /// This is a plain register read; no locks are required.
    fn read_option_register(&mut self) -> OptionRegister;

    /// Unlock the main flash store by writing its two-key sequence
    ///
    /// Returns [`crate::Error::MainUnlockFailed`] if the hardware reports
    /// the store still locked afterwards.
    fn unlock_main(&mut self) -> Result<()>;

    /// Unlock the option-byte region by writing its two-key sequence
    ///
    /// Only meaningful once the main store is unlocked. Returns
    /// [`crate::Error::OptionUnlockFailed`] if the region stays locked.
    fn unlock_options(&mut self) -> Result<()>;

    /// Relock the main flash store
    fn lock_main(&mut self);

    /// Relock the option-byte region
    fn lock_options(&mut self);

    /// Stage a new option register value
    ///
    /// Hardware ignores this unless both locks are open.
    fn write_option_register(&mut self, value: OptionRegister);

    /// Start the option-byte programming cycle for the staged value
    fn start_programming(&mut self);

    /// True while a programming operation is in progress
    fn is_busy(&mut self) -> bool;

    /// Read and clear the option verification error flag
    ///
    /// Returns true if the flag was set. The flag has explicit-clear
    /// semantics; this accessor clears it as a side effect.
    fn take_verify_error(&mut self) -> bool;

    /// Reload option bytes from non-volatile storage
    ///
    /// On real hardware this resets the device as a side effect; control is
    /// not expected to return to the caller.
    fn launch(&mut self);
}
