//! Physical memory mapping for MMIO access
//!
//! Maps a fixed physical register window through `/dev/mem` with `O_SYNC`
//! so accesses are uncached. Requires root.

use crate::error::AspeedError;
use std::fs::OpenOptions;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;

/// A mapped region of physical register space
pub struct PhysMap {
    /// Page-aligned mapping returned by mmap
    map_base: *mut u8,
    /// Length of the mapping
    map_len: usize,
    /// Pointer to the requested physical address within the mapping
    ptr: *mut u8,
    /// Usable length from `ptr`
    len: usize,
}

impl PhysMap {
    /// Map `size` bytes of physical register space at `phys_addr`.
    ///
    /// The caller must ensure the range really is MMIO registers and that
    /// nothing else in the process maps the same window.
    pub fn new(phys_addr: u64, size: usize) -> Result<Self, AspeedError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open("/dev/mem")
            .map_err(|source| AspeedError::DevMem { source })?;

        let page_mask = (unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize) - 1;
        let offset = (phys_addr as usize) & page_mask;
        let aligned_addr = phys_addr & !(page_mask as u64);
        let map_len = (size + offset + page_mask) & !page_mask;

        let map_base = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned_addr as libc::off_t,
            )
        };
        if map_base == libc::MAP_FAILED {
            return Err(AspeedError::MemoryMap {
                address: phys_addr,
                size,
            });
        }

        let map_base = map_base as *mut u8;
        Ok(Self {
            map_base,
            map_len,
            ptr: unsafe { map_base.add(offset) },
            len: size,
        })
    }

    #[inline]
    pub fn read8(&self, offset: usize) -> u8 {
        debug_assert!(offset < self.len);
        unsafe { core::ptr::read_volatile(self.ptr.add(offset)) }
    }

    #[inline]
    pub fn read16(&self, offset: usize) -> u16 {
        debug_assert!(offset + 2 <= self.len && offset & 1 == 0);
        unsafe { core::ptr::read_volatile(self.ptr.add(offset) as *const u16) }
    }

    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= self.len && offset & 3 == 0);
        unsafe { core::ptr::read_volatile(self.ptr.add(offset) as *const u32) }
    }

    #[inline]
    pub fn write8(&self, offset: usize, value: u8) {
        debug_assert!(offset < self.len);
        unsafe { core::ptr::write_volatile(self.ptr.add(offset), value) }
    }

    #[inline]
    pub fn write16(&self, offset: usize, value: u16) {
        debug_assert!(offset + 2 <= self.len && offset & 1 == 0);
        unsafe { core::ptr::write_volatile(self.ptr.add(offset) as *mut u16, value) }
    }

    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= self.len && offset & 3 == 0);
        unsafe { core::ptr::write_volatile(self.ptr.add(offset) as *mut u32, value) }
    }
}

impl Drop for PhysMap {
    fn drop(&mut self) {
        unsafe {
            libc::munmap(self.map_base as *mut libc::c_void, self.map_len);
        }
    }
}

// MMIO registers, not ordinary memory; the usual aliasing concerns do not
// apply to the raw pointers held here.
unsafe impl Send for PhysMap {}
unsafe impl Sync for PhysMap {}
