//! Option-byte mutation protocol
//!
//! [`apply`] makes the device's boot-select option bit match the required
//! state (cleared, so boot source follows the BOOT0 pin), exactly once per
//! boot, without touching any other persistent configuration bit.
//!
//! The sequence is strictly ordered to fail closed: no write is attempted
//! until both locks are open, and every error path relocks whatever was
//! unlocked before propagating.

use crate::error::{Error, Result};
use crate::store::OptionByteStore;

/// Default bound on busy-flag polls during the programming cycle
///
/// The hardware clears the busy flag within a few microseconds; the bound
/// only exists so a store that never clears it cannot hang the boot path.
pub const DEFAULT_BUSY_POLL_LIMIT: u32 = 100_000;

/// Options for the option-byte mutator
#[derive(Debug, Clone)]
pub struct MutatorOptions {
    /// Whether the mutation is enabled at all; when false, [`apply`] is a
    /// no-op that reports [`Outcome::Unchanged`]
    pub enabled: bool,
    /// Maximum number of busy-flag polls before the programming cycle is
    /// declared stuck
    pub busy_poll_limit: u32,
}

impl Default for MutatorOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            busy_poll_limit: DEFAULT_BUSY_POLL_LIMIT,
        }
    }
}

impl MutatorOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the mutation
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the busy-flag poll bound
    pub fn with_busy_poll_limit(mut self, limit: u32) -> Self {
        self.busy_poll_limit = limit;
        self
    }
}

/// Terminal outcome of a successful [`apply`] invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The boot-select bit was already clear; no hardware state was touched
    Unchanged,
    /// The corrected option bytes were committed and a reload was issued.
    /// The device reset is normally immediate; if control does return, the
    /// caller runs on stale configuration and must not assume corrected
    /// behavior until the next boot.
    ResetRequested,
}

/// Correct the boot-select option bit if it is in the wrong state
///
/// Reads the option register and, when the boot-select bit is set, executes
/// the unlock/modify/program/launch sequence that clears it. Successful
/// completion resets the device as a hardware side effect of the reload;
/// [`Outcome::ResetRequested`] is only observed when that reset is delayed
/// or inhibited.
///
/// Must be called at most once per boot, before anything that depends on
/// the corrected boot configuration, with no concurrent store access.
pub fn apply<S: OptionByteStore + ?Sized>(
    store: &mut S,
    options: &MutatorOptions,
) -> Result<Outcome> {
    if !options.enabled {
        return Ok(Outcome::Unchanged);
    }

    let current = store.read_option_register();
    if !current.boot_select_from_option_bit() {
        log::debug!("boot-select bit already clear, boot source follows the BOOT0 pin");
        return Ok(Outcome::Unchanged);
    }

    log::info!("boot-select bit is set, clearing it so the BOOT0 pin selects the boot source");

    if let Err(err) = store.unlock_main() {
        log::error!("failed to unlock main flash store");
        return Err(err);
    }

    if let Err(err) = store.unlock_options() {
        // Never leave the unlock half-done
        store.lock_main();
        log::error!("failed to unlock option-byte region");
        return Err(err);
    }

    // Edit only the bit we own; every other bit is committed exactly as
    // it was read.
    store.write_option_register(current.with_boot_select_cleared());
    store.start_programming();

    let mut polls = options.busy_poll_limit;
    while store.is_busy() {
        if polls == 0 {
            store.lock_options();
            store.lock_main();
            log::error!("option-byte programming never cleared its busy flag");
            return Err(Error::ProgramTimeout);
        }
        polls -= 1;
    }

    if store.take_verify_error() {
        // The hardware contract is to clear the flag; it does not abort the
        // sequence. The reload is still issued.
        log::warn!("option-byte verification error reported, continuing with reload");
    }

    log::warn!("reloading option bytes, device will reset");
    store.launch();

    // The reload is expected to reset before we get here. Relock anyway for
    // the case where the reset is delayed or inhibited.
    store.lock_options();
    store.lock_main();

    Ok(Outcome::ResetRequested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let opts = MutatorOptions::new()
            .with_enabled(false)
            .with_busy_poll_limit(16);
        assert!(!opts.enabled);
        assert_eq!(opts.busy_poll_limit, 16);
    }

    #[test]
    fn test_default_options() {
        let opts = MutatorOptions::default();
        assert!(opts.enabled);
        assert_eq!(opts.busy_poll_limit, DEFAULT_BUSY_POLL_LIMIT);
    }
}
