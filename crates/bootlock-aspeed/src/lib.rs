//! bootlock-aspeed - direct register transport for the AST2400 FMC
//!
//! The alternate command path: instead of going through a flash driver, map
//! the SPI flash controller's CE0 control register and data port from
//! `/dev/mem`, put the controller into user mode (software owns byte-level
//! SPI framing), and hand-build every command frame with explicit
//! chip-select bracketing.
//!
//! Requires root and is only meaningful on an ASPEED BMC; everything above
//! the [`controller::Mmio`] trait is testable off-target.

pub mod controller;
pub mod error;
pub mod physmap;
pub mod regs;
mod transport;

pub use controller::{Mmio, SpiController};
pub use error::AspeedError;
pub use physmap::PhysMap;
pub use transport::{open, AspeedTransport};
