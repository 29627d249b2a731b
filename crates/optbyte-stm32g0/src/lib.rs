//! optbyte-stm32g0 - STM32G0 FLASH peripheral binding
//!
//! Implements [`OptionByteStore`] over the memory-mapped FLASH register
//! block of STM32G0 devices, the family whose nBOOT_SEL option bit the
//! mutation protocol was written for.

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod regs;

use optbyte_core::error::{Error, Result};
use optbyte_core::register::OptionRegister;
use optbyte_core::store::OptionByteStore;

use regs::{
    CR_LOCK, CR_OBL_LAUNCH, CR_OPTLOCK, CR_OPTSTRT, FLASH_BASE, FLASH_KEY1, FLASH_KEY2,
    FLASH_OPTKEY1, FLASH_OPTKEY2, REG_CR, REG_KEYR, REG_OPTKEYR, REG_OPTR, REG_SR, SR_BSY1,
    SR_OPTVERR,
};

/// Raw MMIO view of the STM32G0 FLASH register block
///
/// All register accesses are volatile 32-bit reads and writes relative to
/// the block base address.
pub struct FlashRegs {
    base: *mut u8,
}

impl FlashRegs {
    /// Wrap a FLASH register block at the given base address
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// - `base` points at a mapped STM32G0 FLASH register block
    /// - No other code accesses the flash peripheral for the lifetime of
    ///   this value
    pub const unsafe fn new(base: *mut u8) -> Self {
        Self { base }
    }

    /// Wrap the FLASH register block at its standard peripheral address
    ///
    /// # Safety
    ///
    /// Must only be called on an STM32G0 target, once, during early
    /// single-threaded boot, before anything else touches the flash
    /// peripheral.
    pub unsafe fn at_peripheral() -> Self {
        Self::new(FLASH_BASE as *mut u8)
    }

    #[inline]
    fn read32(&self, offset: usize) -> u32 {
        unsafe { core::ptr::read_volatile(self.base.add(offset) as *const u32) }
    }

    #[inline]
    fn write32(&mut self, offset: usize, value: u32) {
        unsafe { core::ptr::write_volatile(self.base.add(offset) as *mut u32, value) }
    }

    fn set_cr_bits(&mut self, bits: u32) {
        let cr = self.read32(REG_CR);
        self.write32(REG_CR, cr | bits);
    }
}

impl OptionByteStore for FlashRegs {
    fn read_option_register(&mut self) -> OptionRegister {
        OptionRegister::from_raw(self.read32(REG_OPTR))
    }

    fn unlock_main(&mut self) -> Result<()> {
        self.write32(REG_KEYR, FLASH_KEY1);
        self.write32(REG_KEYR, FLASH_KEY2);

        if self.read32(REG_CR) & CR_LOCK != 0 {
            return Err(Error::MainUnlockFailed);
        }
        Ok(())
    }

    fn unlock_options(&mut self) -> Result<()> {
        self.write32(REG_OPTKEYR, FLASH_OPTKEY1);
        self.write32(REG_OPTKEYR, FLASH_OPTKEY2);

        if self.read32(REG_CR) & CR_OPTLOCK != 0 {
            return Err(Error::OptionUnlockFailed);
        }
        Ok(())
    }

    fn lock_main(&mut self) {
        self.set_cr_bits(CR_LOCK);
    }

    fn lock_options(&mut self) {
        self.set_cr_bits(CR_OPTLOCK);
    }

    fn write_option_register(&mut self, value: OptionRegister) {
        self.write32(REG_OPTR, value.raw());
    }

    fn start_programming(&mut self) {
        self.set_cr_bits(CR_OPTSTRT);
    }

    fn is_busy(&mut self) -> bool {
        self.read32(REG_SR) & SR_BSY1 != 0
    }

    fn take_verify_error(&mut self) -> bool {
        if self.read32(REG_SR) & SR_OPTVERR != 0 {
            // Status flags are write-1-to-clear
            self.write32(REG_SR, SR_OPTVERR);
            return true;
        }
        false
    }

    fn launch(&mut self) {
        self.set_cr_bits(CR_OBL_LAUNCH);
    }
}
