//! Error types for the MTD device binding

use std::io;
use thiserror::Error;

/// Errors raised while resolving and opening the boot flash device
#[derive(Debug, Error)]
pub enum MtdError {
    /// No MTD device with the requested name exists
    #[error("no MTD device named '{0}'")]
    DeviceNotFound(String),

    /// The named device is not NOR flash
    #[error("MTD device '{name}' has type '{mtd_type}', expected 'nor'")]
    NotNorFlash { name: String, mtd_type: String },

    /// Failed to read a sysfs attribute
    #[error("failed to read sysfs attribute '{path}': {source}")]
    SysfsRead {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to parse a sysfs attribute
    #[error("failed to parse sysfs attribute '{path}': '{value}'")]
    SysfsParse { path: String, value: String },

    /// The device node could not be opened
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for MTD binding operations
pub type Result<T> = std::result::Result<T, MtdError>;
