//! Driver-delegated lock transport
//!
//! This path never touches controller registers. It rides the host driver's
//! ordinary read/write entry points and swaps the configured opcodes for the
//! volatile lock ones, one transaction at a time, through the scope guards
//! in [`crate::device`]. A transfer that reports zero bytes moved is a
//! command fault.

use crate::chip;
use crate::device::{NorDevice, OpKind, ProgramOpcodeOverride, ReadOpcodeOverride};
use crate::error::{Error, Result};
use crate::opcodes;
use crate::transport::LockTransport;
use log::debug;

/// Lock transport layered over a generic flash device handle
pub struct DelegatedTransport<D: NorDevice> {
    dev: D,
}

impl<D: NorDevice> DelegatedTransport<D> {
    /// Wrap a device handle.
    ///
    /// The lock commands hard-code 4-byte address framing; a handle
    /// configured for any other width is rejected here, before a single
    /// command is issued.
    pub fn new(dev: D) -> Result<Self> {
        let width = dev.config().address_width;
        if width != 4 {
            return Err(Error::InvalidAddressWidth { width });
        }
        Ok(Self { dev })
    }

    pub fn device(&self) -> &D {
        &self.dev
    }

    pub fn into_device(self) -> D {
        self.dev
    }

    /// One single-byte read with the read opcode substituted
    fn read_with(&mut self, opcode: u8, addr: u32) -> Result<u8> {
        let mut buf = [0u8; 1];
        let n = {
            let mut ov = ReadOpcodeOverride::new(&mut self.dev, opcode, 0);
            ov.read_at(addr, &mut buf)?
        };
        if n == 0 {
            return Err(Error::Io);
        }
        Ok(buf[0])
    }
}

impl<D: NorDevice> LockTransport for DelegatedTransport<D> {
    fn prepare(&mut self) -> Result<()> {
        self.dev.prepare(OpKind::LockBits)
    }

    fn unprepare(&mut self) {
        self.dev.unprepare(OpKind::LockBits);
    }

    fn identify(&mut self) -> Result<u32> {
        let mut buf = [0u8; 3];
        let n = {
            let mut ov = ReadOpcodeOverride::new(&mut self.dev, opcodes::RDID, 0);
            ov.read_at(0, &mut buf)?
        };
        if n == 0 {
            return Err(Error::Io);
        }
        Ok(u32::from(buf[0]) << 16 | u32::from(buf[1]) << 8 | u32::from(buf[2]))
    }

    fn is_busy(&mut self) -> Result<bool> {
        let status = self.read_with(opcodes::RDSR, 0)?;
        Ok(status & opcodes::SR1_WIP != 0)
    }

    fn read_lock_bits(&mut self, addr: u32) -> Result<u8> {
        self.read_with(opcodes::RD_VLOCK, addr)
    }

    fn write_lock_bits(&mut self, addr: u32, bits: u8) -> Result<()> {
        debug!("write lock bits {:#04b} at 0x{:08x}", bits, addr);
        let data = [bits & chip::SECTOR_LOCK_BITS];
        let n = {
            let mut ov = ProgramOpcodeOverride::new(&mut self.dev, opcodes::WR_VLOCK);
            ov.write_at(addr, &data)?
        };
        if n == 0 {
            return Err(Error::Io);
        }
        Ok(())
    }
}
