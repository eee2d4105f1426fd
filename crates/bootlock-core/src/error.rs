//! Error type for bootlock-core
//!
//! A no_std compatible error type shared by the engine and both transports.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The flash device or controller window could not be obtained
    ResourceUnavailable,
    /// The identified chip is not in the supported set; no lock commands
    /// were issued against it
    UnsupportedChip {
        /// JEDEC identifier read from the chip (low 24 bits)
        id: u32,
    },
    /// A read or write command reported a short (zero byte) transfer
    Io,
    /// The command path has no control over the opcodes it issues and so
    /// cannot carry the volatile lock commands
    LockUnsupported,
    /// The chip did not clear its busy bit within the poll bound
    Timeout,
    /// The device is configured for an address width other than 4 bytes;
    /// lock command framing is hard-coded to 4-byte addressing
    InvalidAddressWidth {
        /// Configured width in bytes
        width: u8,
    },
    /// A region did not report both lock bits set after engaging lockdown
    VerifyFailed {
        /// Region base address that failed verification
        addr: u32,
        /// Lock bits read back
        bits: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable => write!(f, "flash device or controller unavailable"),
            Self::UnsupportedChip { id } => {
                write!(f, "flash chip {:06x} does not support boot lockdown", id)
            }
            Self::Io => write!(f, "flash command transferred no data"),
            Self::LockUnsupported => {
                write!(f, "command path cannot issue volatile lock commands")
            }
            Self::Timeout => write!(f, "timed out waiting for flash to go ready"),
            Self::InvalidAddressWidth { width } => {
                write!(f, "address width {} unsupported, 4-byte addressing required", width)
            }
            Self::VerifyFailed { addr, bits } => {
                write!(
                    f,
                    "lock verification failed at 0x{:08x}: lock bits read back as {:#04b}",
                    addr, bits
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_chip_id() {
        let e = Error::UnsupportedChip { id: 0xffffff };
        assert!(format!("{}", e).contains("ffffff"));
    }

    #[test]
    fn display_names_the_failing_region() {
        let e = Error::VerifyFailed { addr: 0x10000, bits: 0b01 };
        let msg = format!("{}", e);
        assert!(msg.contains("0x00010000"));
        assert!(msg.contains("0b01"));
    }
}
