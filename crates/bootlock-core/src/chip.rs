//! Known chip table
//!
//! The lock engine refuses to issue vendor-specific lock opcodes against a
//! chip it cannot positively identify: sending them to unknown hardware
//! risks corrupting it. The table is compiled in; entries that are known
//! but carry no volatile lock support are kept for diagnostics only.

/// Per-sector lock flags on the MT25Q: bit 0 = write lock, bit 1 = lock down.
/// Both must be set for a region to count as protected.
pub const SECTOR_LOCK_BITS: u8 = 0b11;

/// A chip the identification command may report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownChip {
    /// JEDEC identifier, packed big-endian into the low 24 bits
    pub id: u32,
    /// Part name for log output
    pub name: &'static str,
    /// Whether the chip implements the volatile sector lock commands
    pub lockable: bool,
}

/// Chips the engine knows about
pub const CHIPS: &[KnownChip] = &[
    KnownChip {
        id: 0x20ba20,
        name: "MT25Q512",
        lockable: true,
    },
    // Seen on older boards; has no volatile lock bits, so lockdown is
    // refused with the part named in the error path.
    KnownChip {
        id: 0x1920c2,
        name: "MX25L256",
        lockable: false,
    },
];

/// Look up a chip by its JEDEC identifier
pub fn find(id: u32) -> Option<&'static KnownChip> {
    CHIPS.iter().find(|c| c.id == id)
}

/// True if the chip supports the lockdown sequence
pub fn is_supported(id: u32) -> bool {
    find(id).is_some_and(|c| c.lockable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt25q_is_supported() {
        assert!(is_supported(0x20ba20));
        assert_eq!(find(0x20ba20).unwrap().name, "MT25Q512");
    }

    #[test]
    fn known_but_lock_incapable_chip_is_refused() {
        assert!(find(0x1920c2).is_some());
        assert!(!is_supported(0x1920c2));
    }

    #[test]
    fn unknown_id_is_refused() {
        assert!(find(0xffffff).is_none());
        assert!(!is_supported(0xffffff));
    }
}
