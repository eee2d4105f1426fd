//! bootlock-dummy - in-memory flash emulator for testing
//!
//! Emulates the slice of MT25Q behavior the lock engine exercises: the
//! identification command, the busy bit, and the volatile sector lock bits,
//! all decoded from whichever opcode is currently configured on the device
//! handle. That makes it a direct test double for the opcode-substitution
//! transport, and it keeps call counters so tests can assert how far a walk
//! actually got.

use bootlock_core::device::{NorConfig, NorDevice, OpKind};
use bootlock_core::{opcodes, region};
use std::collections::BTreeMap;

/// Configuration for the emulated chip
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC identifier reported by the identification command
    pub id: u32,
    /// Number of busy polls reported after each lock-bit write
    pub busy_after_write: u32,
    /// Report a zero-byte transfer for the lock-bit read at this address
    pub fail_read_at: Option<u32>,
    /// Report a zero-byte transfer for the lock-bit write at this address
    pub fail_write_at: Option<u32>,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            id: 0x20ba20, // MT25Q512
            busy_after_write: 2,
            fail_read_at: None,
            fail_write_at: None,
        }
    }
}

/// Emulated boot flash
pub struct DummyNor {
    cfg: DummyConfig,
    config: NorConfig,
    /// Lock bits keyed by lock-region base address; absent means unlocked
    lock_bits: BTreeMap<u32, u8>,
    busy_countdown: u32,
    /// Successful lock-bit reads
    pub lock_reads: u32,
    /// Successful lock-bit writes
    pub lock_writes: u32,
    /// Identification reads
    pub id_reads: u32,
    /// Status register reads
    pub status_reads: u32,
    /// Prepare hook invocations
    pub prepares: u32,
    /// Unprepare hook invocations
    pub unprepares: u32,
}

impl DummyNor {
    pub fn new(cfg: DummyConfig) -> Self {
        Self {
            cfg,
            config: NorConfig::default(),
            lock_bits: BTreeMap::new(),
            busy_countdown: 0,
            lock_reads: 0,
            lock_writes: 0,
            id_reads: 0,
            status_reads: 0,
            prepares: 0,
            unprepares: 0,
        }
    }

    /// MT25Q512 with every region unlocked
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Current lock bits of the region containing `addr`
    pub fn lock_bits(&self, addr: u32) -> u8 {
        self.lock_bits
            .get(&region::region_base(addr))
            .copied()
            .unwrap_or(0)
    }

    /// Force the lock bits of the region containing `addr`
    pub fn set_lock_bits(&mut self, addr: u32, bits: u8) {
        self.lock_bits.insert(region::region_base(addr), bits);
    }

    /// Mark the whole boot area fully locked
    pub fn lock_all(&mut self) {
        for addr in region::boot_regions() {
            self.lock_bits.insert(addr, 0b11);
        }
    }

    /// Report busy for the next `polls` status reads
    pub fn force_busy(&mut self, polls: u32) {
        self.busy_countdown = polls;
    }
}

impl NorDevice for DummyNor {
    fn config(&self) -> &NorConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut NorConfig {
        &mut self.config
    }

    fn prepare(&mut self, _kind: OpKind) -> bootlock_core::Result<()> {
        self.prepares += 1;
        Ok(())
    }

    fn unprepare(&mut self, _kind: OpKind) {
        self.unprepares += 1;
    }

    fn read_at(&mut self, addr: u32, buf: &mut [u8]) -> bootlock_core::Result<usize> {
        match self.config.read_opcode {
            opcodes::RDID => {
                self.id_reads += 1;
                let id = self.cfg.id;
                let bytes = [(id >> 16) as u8, (id >> 8) as u8, id as u8];
                let n = buf.len().min(bytes.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                Ok(n)
            }
            opcodes::RDSR => {
                self.status_reads += 1;
                let busy = self.busy_countdown > 0;
                if busy {
                    self.busy_countdown -= 1;
                }
                buf[0] = if busy { opcodes::SR1_WIP } else { 0 };
                Ok(1)
            }
            opcodes::RD_VLOCK => {
                if self.cfg.fail_read_at == Some(addr) {
                    return Ok(0);
                }
                self.lock_reads += 1;
                buf[0] = self.lock_bits(addr);
                Ok(1)
            }
            // The emulator carries no data array; ordinary reads are out of
            // scope for the lock sequence.
            _ => Ok(0),
        }
    }

    fn write_at(&mut self, addr: u32, data: &[u8]) -> bootlock_core::Result<usize> {
        match self.config.program_opcode {
            opcodes::WR_VLOCK => {
                if self.cfg.fail_write_at == Some(addr) {
                    return Ok(0);
                }
                self.lock_writes += 1;
                self.lock_bits
                    .insert(region::region_base(addr), data[0] & 0b11);
                self.busy_countdown = self.cfg.busy_after_write;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
