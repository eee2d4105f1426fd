//! bootlock-mtd - Linux MTD binding for the boot flash
//!
//! Resolves the boot flash by its MTD partition name, validates that it is
//! NOR flash, and exposes it as a [`bootlock_core::device::NorDevice`].
//! Binding happens once at startup; a name that does not resolve (or
//! resolves to non-NOR media) means the lock operations are never offered.
//!
//! The kernel MTD layer issues its own flash commands and gives userspace
//! no control over the opcode on the wire, so this handle carries the plain
//! data path only: lock-bit sessions and substituted opcodes are refused
//! with [`bootlock_core::Error::LockUnsupported`] instead of being silently
//! rewritten into data transfers.

pub mod device;
pub mod error;

pub use device::{MtdInfo, MtdNor};
pub use error::MtdError;
