//! Boot protection range and its lock-region stepping
//!
//! The protected range is the first 512 KiB of flash, which holds the boot
//! firmware. The MT25Q protects it at two granularities: the first 64 KiB
//! sector is split into 4 KiB subsectors with individual lock bits, the rest
//! of the range locks per 64 KiB sector. Every lock-bit command must be
//! addressed to a region base; reading or writing lock bits at any other
//! address is meaningless, so all walks go through [`boot_regions`].

/// Length of the protected boot area
pub const BOOT_AREA_LEN: u32 = 512 * 1024;

/// Length of the leading area with fine-grained (subsector) locking
pub const SUBSECTOR_AREA_LEN: u32 = 64 * 1024;

/// Lock granularity within the subsector area
pub const SUBSECTOR_LEN: u32 = 4 * 1024;

/// Lock granularity for the remainder of the boot area
pub const SECTOR_LEN: u32 = 64 * 1024;

/// Number of lock regions covering the boot area (16 fine + 7 coarse)
pub const REGION_COUNT: usize = 23;

/// Iterate the base address of every lock region in the boot area, in
/// ascending order: 0, 4096, .., 61440, then 65536, 131072, .., 458752.
pub fn boot_regions() -> impl Iterator<Item = u32> + Clone {
    (0..SUBSECTOR_AREA_LEN)
        .step_by(SUBSECTOR_LEN as usize)
        .chain((SUBSECTOR_AREA_LEN..BOOT_AREA_LEN).step_by(SECTOR_LEN as usize))
}

/// Base address of the lock region containing `addr`
pub fn region_base(addr: u32) -> u32 {
    if addr < SUBSECTOR_AREA_LEN {
        addr & !(SUBSECTOR_LEN - 1)
    } else {
        addr & !(SECTOR_LEN - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_is_deterministic() {
        let mut it = boot_regions();
        for expected in (0..16u32).map(|i| i * 4096) {
            assert_eq!(it.next(), Some(expected));
        }
        for expected in (1..8u32).map(|i| i * 65536) {
            assert_eq!(it.next(), Some(expected));
        }
        assert_eq!(it.next(), None);
    }

    #[test]
    fn walk_has_23_steps() {
        assert_eq!(boot_regions().count(), REGION_COUNT);
        assert_eq!(boot_regions().next(), Some(0));
        assert_eq!(boot_regions().last(), Some(458752));
    }

    #[test]
    fn every_step_is_its_own_region_base() {
        assert!(boot_regions().all(|a| region_base(a) == a));
    }

    #[test]
    fn region_base_tiers() {
        assert_eq!(region_base(4097), 4096);
        assert_eq!(region_base(61440 + 100), 61440);
        assert_eq!(region_base(65536 + 4096), 65536);
        assert_eq!(region_base(458752 + 65535), 458752);
    }
}
