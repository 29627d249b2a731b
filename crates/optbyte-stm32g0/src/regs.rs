//! STM32G0 FLASH peripheral register definitions
//!
//! Offsets and bit positions from the STM32G0x0/G0x1 reference manual
//! (RM0454/RM0444), FLASH chapter.

/// FLASH register block base address
pub const FLASH_BASE: usize = 0x4002_2000;

/// Flash key register (32 bits, write-only)
pub const REG_KEYR: usize = 0x08;
/// Option byte key register (32 bits, write-only)
pub const REG_OPTKEYR: usize = 0x0C;
/// Status register (32 bits)
pub const REG_SR: usize = 0x10;
/// Control register (32 bits)
pub const REG_CR: usize = 0x14;
/// Option byte register (32 bits)
pub const REG_OPTR: usize = 0x20;

// KEYR unlock sequence
/// First main-store unlock key
pub const FLASH_KEY1: u32 = 0x4567_0123;
/// Second main-store unlock key
pub const FLASH_KEY2: u32 = 0xCDEF_89AB;

// OPTKEYR unlock sequence
/// First option-region unlock key
pub const FLASH_OPTKEY1: u32 = 0x0819_2A3B;
/// Second option-region unlock key
pub const FLASH_OPTKEY2: u32 = 0x4C5D_6E7F;

// CR bits
/// Start option byte programming
pub const CR_OPTSTRT: u32 = 1 << 17;
/// Force option byte reload (resets the device)
pub const CR_OBL_LAUNCH: u32 = 1 << 27;
/// Option byte lock
pub const CR_OPTLOCK: u32 = 1 << 30;
/// Main flash lock
pub const CR_LOCK: u32 = 1 << 31;

// SR bits
/// Option byte verification error (write 1 to clear)
pub const SR_OPTVERR: u32 = 1 << 15;
/// Operation in progress on bank 1
pub const SR_BSY1: u32 = 1 << 16;
