//! Error types for the AST2400 transport

use std::io;
use thiserror::Error;

/// Errors raised while setting up the register transport
#[derive(Debug, Error)]
pub enum AspeedError {
    /// /dev/mem could not be opened
    #[error("cannot open /dev/mem: {source}")]
    DevMem {
        #[source]
        source: io::Error,
    },

    /// mmap of a register window failed
    #[error("failed to map physical window {address:#x} (+{size:#x})")]
    MemoryMap { address: u64, size: usize },

    /// Configuration rejected by the core transport checks
    #[error(transparent)]
    Core(#[from] bootlock_core::Error),
}
