//! Command implementations

pub mod lock;
