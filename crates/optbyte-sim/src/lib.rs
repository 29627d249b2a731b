//! optbyte-sim - Simulated option-byte store for testing
//!
//! This crate provides an in-memory implementation of
//! [`OptionByteStore`] with fault injection and a journal of every
//! hardware operation. It exists because the real success path is
//! inherently unobservable from within a test process: committing the
//! corrected option bytes resets the device.

#![cfg_attr(not(feature = "std"), no_std)]

use heapless::Vec;
use optbyte_core::error::{Error, Result};
use optbyte_core::register::OptionRegister;
use optbyte_core::store::{OptionByteStore, UnlockState};

/// Journal capacity; the full protocol records well under this many ops
const JOURNAL_CAPACITY: usize = 32;

/// One recorded hardware operation
///
/// Busy polls and register reads are not journaled; they carry no state
/// change worth asserting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Main-store unlock key sequence was written
    UnlockMain,
    /// Option-region unlock key sequence was written
    UnlockOptions,
    /// Main-store lock bit was set
    LockMain,
    /// Option-region lock bit was set
    LockOptions,
    /// An option register value was staged (raw word recorded)
    Write(u32),
    /// A programming cycle was started
    Program,
    /// An option-byte reload was issued
    Launch,
}

/// Simulated option-byte store
///
/// Fault injection is controlled through public fields; set them before
/// handing the store to the code under test.
pub struct SimStore {
    /// Fail the next (and every) main-store unlock attempt
    pub fail_main_unlock: bool,
    /// Fail the next (and every) option-region unlock attempt
    pub fail_option_unlock: bool,
    /// Keep the busy flag asserted forever once programming starts
    pub hold_busy: bool,
    /// Report a verification error after the programming cycle
    pub verify_error: bool,

    optr: u32,
    staged: Option<u32>,
    locked_main: bool,
    locked_options: bool,
    programming: bool,
    busy_polls_left: u32,
    reset_requested: bool,
    journal: Vec<StoreOp, JOURNAL_CAPACITY>,
}

impl SimStore {
    /// Create a simulated store with the given initial option register
    pub fn new(initial_optr: u32) -> Self {
        Self {
            fail_main_unlock: false,
            fail_option_unlock: false,
            hold_busy: false,
            verify_error: false,
            optr: initial_optr,
            staged: None,
            locked_main: true,
            locked_options: true,
            programming: false,
            busy_polls_left: 0,
            reset_requested: false,
            journal: Vec::new(),
        }
    }

    /// The committed option register word
    pub fn optr(&self) -> u32 {
        self.optr
    }

    /// The recorded hardware operations, in order
    pub fn journal(&self) -> &[StoreOp] {
        &self.journal
    }

    /// Current lock state of the simulated store
    pub fn unlock_state(&self) -> UnlockState {
        match (self.locked_main, self.locked_options) {
            (false, false) => UnlockState::MainAndOptionUnlocked,
            (false, true) => UnlockState::MainUnlocked,
            (true, _) => UnlockState::Locked,
        }
    }

    /// True if an option-byte reload was issued
    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    fn record(&mut self, op: StoreOp) {
        if self.journal.push(op).is_err() {
            log::warn!("simulated store journal full, dropping {:?}", op);
        }
    }
}

impl OptionByteStore for SimStore {
    fn read_option_register(&mut self) -> OptionRegister {
        OptionRegister::from_raw(self.optr)
    }

    fn unlock_main(&mut self) -> Result<()> {
        self.record(StoreOp::UnlockMain);
        if self.fail_main_unlock {
            return Err(Error::MainUnlockFailed);
        }
        self.locked_main = false;
        Ok(())
    }

    fn unlock_options(&mut self) -> Result<()> {
        self.record(StoreOp::UnlockOptions);
        if self.fail_option_unlock || self.locked_main {
            return Err(Error::OptionUnlockFailed);
        }
        self.locked_options = false;
        Ok(())
    }

    fn lock_main(&mut self) {
        self.record(StoreOp::LockMain);
        self.locked_main = true;
    }

    fn lock_options(&mut self) {
        self.record(StoreOp::LockOptions);
        self.locked_options = true;
    }

    fn write_option_register(&mut self, value: OptionRegister) {
        self.record(StoreOp::Write(value.raw()));
        // Hardware ignores the write unless both locks are open
        if !self.locked_main && !self.locked_options {
            self.staged = Some(value.raw());
        }
    }

    fn start_programming(&mut self) {
        self.record(StoreOp::Program);
        if self.locked_main || self.locked_options {
            return;
        }
        if let Some(staged) = self.staged.take() {
            self.optr = staged;
        }
        self.programming = true;
        self.busy_polls_left = 2;
    }

    fn is_busy(&mut self) -> bool {
        if !self.programming {
            return false;
        }
        if self.hold_busy {
            return true;
        }
        if self.busy_polls_left > 0 {
            self.busy_polls_left -= 1;
            return true;
        }
        self.programming = false;
        false
    }

    fn take_verify_error(&mut self) -> bool {
        core::mem::take(&mut self.verify_error)
    }

    fn launch(&mut self) {
        self.record(StoreOp::Launch);
        self.reset_requested = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optbyte_core::register::OptrFlags;
    use optbyte_core::{apply, MutatorOptions, Outcome};

    const NBOOT_SEL: u32 = OptrFlags::NBOOT_SEL.bits();

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_already_pin_controlled_is_noop() {
        init_logs();
        // Scenario A: boot-select clear, reserved bits 0b101
        let mut store = SimStore::new(0b101);

        let outcome = apply(&mut store, &MutatorOptions::default()).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert_eq!(store.optr(), 0b101);
        assert!(store.journal().is_empty());
        assert_eq!(store.unlock_state(), UnlockState::Locked);
    }

    #[test]
    fn test_noop_is_idempotent() {
        init_logs();
        let mut store = SimStore::new(0b101);
        let options = MutatorOptions::default();

        for _ in 0..3 {
            let outcome = apply(&mut store, &options).unwrap();
            assert_eq!(outcome, Outcome::Unchanged);
        }
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_corrects_boot_select_and_requests_reset() {
        init_logs();
        // Scenario B: boot-select set, reserved bits 0b101
        let mut store = SimStore::new(NBOOT_SEL | 0b101);

        let outcome = apply(&mut store, &MutatorOptions::default()).unwrap();

        assert_eq!(outcome, Outcome::ResetRequested);
        assert_eq!(
            store.journal(),
            &[
                StoreOp::UnlockMain,
                StoreOp::UnlockOptions,
                StoreOp::Write(0b101),
                StoreOp::Program,
                StoreOp::Launch,
                StoreOp::LockOptions,
                StoreOp::LockMain,
            ]
        );
        assert_eq!(store.optr(), 0b101);
        assert!(store.reset_requested());
        assert_eq!(store.unlock_state(), UnlockState::Locked);
    }

    #[test]
    fn test_commit_flips_exactly_one_bit() {
        init_logs();
        for reserved in [0u32, 0b101, 0x0600_3FFF, !NBOOT_SEL] {
            let initial = reserved | NBOOT_SEL;
            let mut store = SimStore::new(initial);

            apply(&mut store, &MutatorOptions::default()).unwrap();

            let diff = store.optr() ^ initial;
            assert_eq!(diff.count_ones(), 1);
            assert_eq!(diff, NBOOT_SEL);
        }
    }

    #[test]
    fn test_main_unlock_failure_fails_closed() {
        init_logs();
        let mut store = SimStore::new(NBOOT_SEL | 0b101);
        store.fail_main_unlock = true;

        let err = apply(&mut store, &MutatorOptions::default()).unwrap_err();

        assert_eq!(err, Error::MainUnlockFailed);
        assert_eq!(store.unlock_state(), UnlockState::Locked);
        assert_eq!(store.optr(), NBOOT_SEL | 0b101);
        assert!(!store
            .journal()
            .iter()
            .any(|op| matches!(op, StoreOp::Write(_))));
    }

    #[test]
    fn test_option_unlock_failure_relocks_main() {
        init_logs();
        // Scenario C: option-region unlock fails after the main store opened
        let mut store = SimStore::new(NBOOT_SEL | 0b101);
        store.fail_option_unlock = true;

        let err = apply(&mut store, &MutatorOptions::default()).unwrap_err();

        assert_eq!(err, Error::OptionUnlockFailed);
        assert_eq!(
            store.journal(),
            &[
                StoreOp::UnlockMain,
                StoreOp::UnlockOptions,
                StoreOp::LockMain,
            ]
        );
        assert_eq!(store.unlock_state(), UnlockState::Locked);
        assert_eq!(store.optr(), NBOOT_SEL | 0b101);
    }

    #[test]
    fn test_verify_error_does_not_block_launch() {
        init_logs();
        let mut store = SimStore::new(NBOOT_SEL);
        store.verify_error = true;

        let outcome = apply(&mut store, &MutatorOptions::default()).unwrap();

        assert_eq!(outcome, Outcome::ResetRequested);
        assert!(store.journal().contains(&StoreOp::Launch));
        // The flag was consumed
        assert!(!store.verify_error);
    }

    #[test]
    fn test_stuck_busy_flag_times_out_and_relocks() {
        init_logs();
        let mut store = SimStore::new(NBOOT_SEL | 0b101);
        store.hold_busy = true;
        let options = MutatorOptions::new().with_busy_poll_limit(16);

        let err = apply(&mut store, &options).unwrap_err();

        assert_eq!(err, Error::ProgramTimeout);
        assert_eq!(store.unlock_state(), UnlockState::Locked);
        assert!(!store.reset_requested());
        assert!(!store.journal().contains(&StoreOp::Launch));
    }

    #[test]
    fn test_disabled_mutator_is_noop() {
        init_logs();
        let mut store = SimStore::new(NBOOT_SEL | 0b101);
        let options = MutatorOptions::new().with_enabled(false);

        let outcome = apply(&mut store, &options).unwrap();

        assert_eq!(outcome, Outcome::Unchanged);
        assert!(store.journal().is_empty());
        assert_eq!(store.optr(), NBOOT_SEL | 0b101);
    }

    #[test]
    fn test_write_ignored_while_locked() {
        init_logs();
        let mut store = SimStore::new(NBOOT_SEL);

        store.write_option_register(OptionRegister::from_raw(0));
        store.start_programming();

        assert_eq!(store.optr(), NBOOT_SEL);
    }
}
