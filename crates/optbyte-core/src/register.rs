//! Option register model
//!
//! The option register (OPTR) is a 32-bit word of persistent device
//! configuration. This crate owns exactly one bit of it, the boot-select
//! bit; everything else is opaque and must survive a rewrite bit-exactly.

use bitflags::bitflags;

bitflags! {
    /// User boot option bits within the OPTR word
    ///
    /// Only `NBOOT_SEL` is ever modified by this crate. `NBOOT1` and
    /// `NBOOT0` are defined for diagnostics; like every other bit they are
    /// preserved verbatim across a rewrite.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OptrFlags: u32 {
        /// Boot source selected by the nBOOT0 option bit instead of the
        /// BOOT0 pin
        const NBOOT_SEL = 1 << 24;
        /// nBOOT1 option bit
        const NBOOT1 = 1 << 25;
        /// nBOOT0 option bit
        const NBOOT0 = 1 << 26;
    }
}

/// Snapshot of the device's option register at a point in time
///
/// A value is only ever obtained from a hardware read (or a test fixture)
/// and edited one owned bit at a time. There is deliberately no way to
/// construct a register value field by field: rewriting anything but the
/// boot-select bit would corrupt unrelated persistent configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRegister(u32);

impl OptionRegister {
    /// Wrap a raw OPTR word as read from hardware
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw OPTR word
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True if the boot source is selected by the option bit rather than
    /// the BOOT0 pin
    pub const fn boot_select_from_option_bit(self) -> bool {
        self.0 & OptrFlags::NBOOT_SEL.bits() != 0
    }

    /// Copy of this snapshot with only the boot-select bit cleared
    #[must_use]
    pub const fn with_boot_select_cleared(self) -> Self {
        Self(self.0 & !OptrFlags::NBOOT_SEL.bits())
    }

    /// The known boot option flags present in this snapshot
    pub const fn flags(self) -> OptrFlags {
        OptrFlags::from_bits_truncate(self.0)
    }
}
