//! AST2400 FMC register layout
//!
//! Two fixed physical windows, mapped once at startup and never relocated:
//! the CE0 control registers and the CE0 flash data port. In user mode every
//! byte written to the data port is clocked out on the SPI bus and every
//! read clocks a byte in.

use bitflags::bitflags;

/// Physical base of the CE0 control register window
pub const CTRL_BASE: u64 = 0x1e62_0010;
/// Length of the control window
pub const CTRL_WINDOW_LEN: usize = 0x14;

/// Physical base of the CE0 flash data port
pub const FLASH_BASE: u64 = 0x2000_0000;
/// Length of the data port window
pub const FLASH_WINDOW_LEN: usize = 0x10;

/// CE0 control register, offset within the control window
pub const CE0_CTRL: usize = 0x00;

bitflags! {
    /// CE0 control register bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Ce0Ctrl: u32 {
        /// Command mode field set to user mode: software frames every
        /// transaction through the data port
        const USER_MODE = 0b11;
        /// CS# line; active low, so setting this bit deasserts the chip
        const CS_INACTIVE = 1 << 2;
    }
}

/// Shift of the clock divider field
pub const CLOCK_DIV_SHIFT: u32 = 8;
/// Width mask of the clock divider field
pub const CLOCK_DIV_MASK: u32 = 0x0f;
