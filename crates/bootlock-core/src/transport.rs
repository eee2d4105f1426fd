//! Lock transport capability
//!
//! One trait, two implementations: the driver-delegated path
//! ([`crate::delegate::DelegatedTransport`]) and the direct register path
//! (`bootlock-aspeed`). The engine is written against this trait only, so
//! the transport is a configuration choice, not a source fork.

use crate::error::Result;

/// A command path able to issue the volatile lock sequence
pub trait LockTransport {
    /// Bracket the start of a lock session: suspend the device's normal
    /// operating mode and, for the register path, hand SPI framing control
    /// to software. Must be balanced by exactly one
    /// [`LockTransport::unprepare`] when it returns `Ok`.
    fn prepare(&mut self) -> Result<()>;

    /// Bracket the end of a lock session
    fn unprepare(&mut self);

    /// Issue the identification command; returns the 3-byte JEDEC
    /// identifier packed into the low 24 bits
    fn identify(&mut self) -> Result<u32>;

    /// Issue a status read; true while a write-type command is in progress
    fn is_busy(&mut self) -> Result<bool>;

    /// Read the volatile lock bits of the region based at `addr`.
    /// `addr` must be a lock-region base (see [`crate::region`]).
    fn read_lock_bits(&mut self, addr: u32) -> Result<u8>;

    /// Write the volatile lock bits of the region based at `addr`.
    /// Only the low two bits are significant.
    fn write_lock_bits(&mut self, addr: u32, bits: u8) -> Result<()>;
}
