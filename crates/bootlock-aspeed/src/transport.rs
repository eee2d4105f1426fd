//! LockTransport implementation over the user-mode controller

use crate::controller::{Mmio, SpiController};
use crate::error::AspeedError;
use crate::physmap::PhysMap;
use crate::regs;
use bootlock_core::device::NorConfig;
use bootlock_core::error::{Error, Result};
use bootlock_core::transport::LockTransport;
use bootlock_core::{chip, opcodes};
use log::info;

/// Direct register transport for the boot flash on CE0.
///
/// Hardware faults surface as whatever raw value was read; a bad identifier
/// fails the engine's compatibility check rather than raising a distinct
/// I/O error, so every command here is infallible by construction.
pub struct AspeedTransport<M: Mmio> {
    ctl: SpiController<M>,
}

impl<M: Mmio> AspeedTransport<M> {
    /// Wrap a controller. The command framing hard-codes 4-byte addresses,
    /// so any other configured width is rejected up front.
    pub fn new(ctl: SpiController<M>, config: &NorConfig) -> Result<Self> {
        let width = config.address_width;
        if width != 4 {
            return Err(Error::InvalidAddressWidth { width });
        }
        Ok(Self { ctl })
    }
}

impl<M: Mmio> LockTransport for AspeedTransport<M> {
    fn prepare(&mut self) -> Result<()> {
        self.ctl.set_user_control(true);
        Ok(())
    }

    fn unprepare(&mut self) {
        self.ctl.set_user_control(false);
    }

    fn identify(&mut self) -> Result<u32> {
        Ok(self.ctl.identify())
    }

    fn is_busy(&mut self) -> Result<bool> {
        Ok(self.ctl.read_status() & opcodes::SR1_WIP != 0)
    }

    fn read_lock_bits(&mut self, addr: u32) -> Result<u8> {
        Ok(self.ctl.read_byte(opcodes::RD_VLOCK, addr))
    }

    fn write_lock_bits(&mut self, addr: u32, bits: u8) -> Result<()> {
        self.ctl
            .write_byte(opcodes::WR_VLOCK, addr, bits & chip::SECTOR_LOCK_BITS);
        Ok(())
    }
}

/// Map the CE0 register windows and build the transport.
///
/// Mapping happens once here; the windows stay in place for the process
/// lifetime. Fails if /dev/mem is unavailable (not root, or lockdown) or
/// the device is configured for a non-4-byte address width.
pub fn open(config: &NorConfig, clock_div: u8) -> std::result::Result<AspeedTransport<PhysMap>, AspeedError> {
    let ctrl = PhysMap::new(regs::CTRL_BASE, regs::CTRL_WINDOW_LEN)?;
    let flash = PhysMap::new(regs::FLASH_BASE, regs::FLASH_WINDOW_LEN)?;
    let mut ctl = SpiController::new(ctrl, flash, clock_div);
    ctl.reset();
    info!(
        "mapped FMC CE0 windows ({:#x}, {:#x}), clock divider {}",
        regs::CTRL_BASE,
        regs::FLASH_BASE,
        clock_div
    );
    Ok(AspeedTransport::new(ctl, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_4byte_address_width() {
        // Controller construction is cheap; reuse the core check through a
        // config with 3-byte addressing.
        struct NullMmio;
        impl Mmio for NullMmio {
            fn read8(&self, _: usize) -> u8 {
                0
            }
            fn read16(&self, _: usize) -> u16 {
                0
            }
            fn read32(&self, _: usize) -> u32 {
                0
            }
            fn write8(&self, _: usize, _: u8) {}
            fn write16(&self, _: usize, _: u16) {}
            fn write32(&self, _: usize, _: u32) {}
        }

        let ctl = SpiController::new(NullMmio, NullMmio, 6);
        let config = NorConfig {
            address_width: 3,
            ..NorConfig::default()
        };
        assert_eq!(
            AspeedTransport::new(ctl, &config).err(),
            Some(Error::InvalidAddressWidth { width: 3 })
        );
    }
}
