//! bootlock-core - boot-area protection engine for SPI NOR flash
//!
//! This crate implements the one-way lockdown primitive used to harden BMC
//! boot firmware: it reads and sets the per-sector volatile lock bits of the
//! boot flash over one fixed 512 KiB range. Once engaged, the lock bits block
//! erase and program of the boot area until the chip is power-cycled.
//!
//! # Architecture
//!
//! The engine is transport-agnostic. Two command paths implement the
//! [`transport::LockTransport`] capability:
//!
//! - [`delegate::DelegatedTransport`] - reuses a host flash driver's normal
//!   read/write entry points (any [`device::NorDevice`]) with the lock-bit
//!   opcodes temporarily substituted for the configured ones.
//! - `bootlock-aspeed` (separate crate) - drives the flash controller's
//!   chip-select and user-control registers directly and hand-builds each
//!   command frame.
//!
//! The engine itself ([`engine`], `std` only) serializes access through a
//! `Mutex`, brackets every invocation with prepare/unprepare, gates on the
//! chip allow-list, and walks the boot range at the chip's lock-region
//! granularity.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod chip;
pub mod delegate;
pub mod device;
#[cfg(feature = "std")]
pub mod engine;
pub mod error;
pub mod opcodes;
pub mod region;
pub mod transport;

pub use error::{Error, Result};
pub use transport::LockTransport;
