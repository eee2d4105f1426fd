//! SPI flash opcodes used by the lock engine
//!
//! Only the commands the lockdown sequence actually issues are listed here;
//! this is deliberately not a general SPI NOR opcode table. The volatile
//! lock-bit commands are Micron MT25Q vendor opcodes, not JEDEC standard.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write-type command
pub const WREN: u8 = 0x06;

// ============================================================================
// Status and identification
// ============================================================================

/// Read Status Register 1
pub const RDSR: u8 = 0x05;
/// Read JEDEC ID (manufacturer + device ID)
pub const RDID: u8 = 0x9F;

/// Write In Progress bit in status register 1
pub const SR1_WIP: u8 = 0x01;

// ============================================================================
// Ordinary data path (the opcodes a host driver normally has configured;
// the delegated transport saves and restores these around lock commands)
// ============================================================================

/// Fast Read (with dummy cycles)
pub const FAST_READ: u8 = 0x0B;
/// Page Program
pub const PP: u8 = 0x02;

// ============================================================================
// Volatile sector lock (Micron MT25Q)
// ============================================================================

/// Read Volatile Lock Bits - one byte of lock flags per sector
pub const RD_VLOCK: u8 = 0xE8;
/// Write Volatile Lock Bits - effective until power cycle or reset
pub const WR_VLOCK: u8 = 0xE5;
