//! Flash device handle abstraction
//!
//! The lock engine does not own the boot flash; it borrows whatever driver
//! normally does. [`NorDevice`] is the surface that driver must expose: its
//! currently configured opcodes (mutable, so lock commands can be swapped in
//! for one transaction), prepare/unprepare hooks bracketing privileged
//! command sequences, and plain positioned read/write primitives that report
//! how many bytes actually moved.
//!
//! Opcode substitution is done through scope guards
//! ([`ReadOpcodeOverride`], [`ProgramOpcodeOverride`]) so the saved values
//! are restored on every exit path, including errors.

use crate::error::Result;
use crate::opcodes;

/// Operation kind passed to the prepare/unprepare hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Ordinary data read
    Read,
    /// Ordinary program
    Write,
    /// Volatile lock-bit command sequence
    LockBits,
}

/// Currently configured command set of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NorConfig {
    /// Opcode the driver issues for reads
    pub read_opcode: u8,
    /// Dummy cycles clocked after the read address
    pub read_dummy: u8,
    /// Opcode the driver issues for programming
    pub program_opcode: u8,
    /// Address width in bytes; the lock transports require 4
    pub address_width: u8,
}

impl Default for NorConfig {
    fn default() -> Self {
        Self {
            read_opcode: opcodes::FAST_READ,
            read_dummy: 8,
            program_opcode: opcodes::PP,
            address_width: 4,
        }
    }
}

/// The flash device handle the engine borrows
pub trait NorDevice {
    /// Current opcode configuration
    fn config(&self) -> &NorConfig;

    /// Mutable opcode configuration, for scoped substitution
    fn config_mut(&mut self) -> &mut NorConfig;

    /// Place the device into a mode safe for the given operation.
    /// Must be balanced by exactly one [`NorDevice::unprepare`].
    fn prepare(&mut self, kind: OpKind) -> Result<()>;

    /// Resume the device's normal operating mode
    fn unprepare(&mut self, kind: OpKind);

    /// Read using the configured read opcode; returns bytes transferred
    fn read_at(&mut self, addr: u32, buf: &mut [u8]) -> Result<usize>;

    /// Write using the configured program opcode; returns bytes transferred
    fn write_at(&mut self, addr: u32, data: &[u8]) -> Result<usize>;
}

/// Scoped substitution of the read opcode and dummy-cycle count.
///
/// The previous values are restored when the guard drops, whether the
/// transaction succeeded or not.
pub struct ReadOpcodeOverride<'a, D: NorDevice> {
    dev: &'a mut D,
    saved_opcode: u8,
    saved_dummy: u8,
}

impl<'a, D: NorDevice> ReadOpcodeOverride<'a, D> {
    pub fn new(dev: &'a mut D, opcode: u8, dummy: u8) -> Self {
        let cfg = dev.config_mut();
        let saved_opcode = core::mem::replace(&mut cfg.read_opcode, opcode);
        let saved_dummy = core::mem::replace(&mut cfg.read_dummy, dummy);
        Self {
            dev,
            saved_opcode,
            saved_dummy,
        }
    }

    pub fn read_at(&mut self, addr: u32, buf: &mut [u8]) -> Result<usize> {
        self.dev.read_at(addr, buf)
    }
}

impl<D: NorDevice> Drop for ReadOpcodeOverride<'_, D> {
    fn drop(&mut self) {
        let cfg = self.dev.config_mut();
        cfg.read_opcode = self.saved_opcode;
        cfg.read_dummy = self.saved_dummy;
    }
}

/// Scoped substitution of the program opcode
pub struct ProgramOpcodeOverride<'a, D: NorDevice> {
    dev: &'a mut D,
    saved_opcode: u8,
}

impl<'a, D: NorDevice> ProgramOpcodeOverride<'a, D> {
    pub fn new(dev: &'a mut D, opcode: u8) -> Self {
        let cfg = dev.config_mut();
        let saved_opcode = core::mem::replace(&mut cfg.program_opcode, opcode);
        Self { dev, saved_opcode }
    }

    pub fn write_at(&mut self, addr: u32, data: &[u8]) -> Result<usize> {
        self.dev.write_at(addr, data)
    }
}

impl<D: NorDevice> Drop for ProgramOpcodeOverride<'_, D> {
    fn drop(&mut self) {
        self.dev.config_mut().program_opcode = self.saved_opcode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct TestDev {
        config: NorConfig,
        fail_reads: bool,
    }

    impl NorDevice for TestDev {
        fn config(&self) -> &NorConfig {
            &self.config
        }

        fn config_mut(&mut self) -> &mut NorConfig {
            &mut self.config
        }

        fn prepare(&mut self, _kind: OpKind) -> Result<()> {
            Ok(())
        }

        fn unprepare(&mut self, _kind: OpKind) {}

        fn read_at(&mut self, _addr: u32, buf: &mut [u8]) -> Result<usize> {
            if self.fail_reads {
                return Err(Error::Io);
            }
            Ok(buf.len())
        }

        fn write_at(&mut self, _addr: u32, data: &[u8]) -> Result<usize> {
            Ok(data.len())
        }
    }

    #[test]
    fn read_override_restores_on_success() {
        let mut dev = TestDev {
            config: NorConfig::default(),
            fail_reads: false,
        };
        {
            let mut ov = ReadOpcodeOverride::new(&mut dev, opcodes::RD_VLOCK, 0);
            let mut buf = [0u8; 1];
            ov.read_at(0, &mut buf).unwrap();
        }
        assert_eq!(dev.config.read_opcode, opcodes::FAST_READ);
        assert_eq!(dev.config.read_dummy, 8);
    }

    #[test]
    fn read_override_restores_on_failure() {
        let mut dev = TestDev {
            config: NorConfig::default(),
            fail_reads: true,
        };
        let result = {
            let mut ov = ReadOpcodeOverride::new(&mut dev, opcodes::RDID, 0);
            let mut buf = [0u8; 3];
            ov.read_at(0, &mut buf)
        };
        assert_eq!(result, Err(Error::Io));
        assert_eq!(dev.config.read_opcode, opcodes::FAST_READ);
        assert_eq!(dev.config.read_dummy, 8);
    }

    #[test]
    fn program_override_restores() {
        let mut dev = TestDev {
            config: NorConfig::default(),
            fail_reads: false,
        };
        {
            let mut ov = ProgramOpcodeOverride::new(&mut dev, opcodes::WR_VLOCK);
            ov.write_at(0, &[0b11]).unwrap();
            assert_eq!(ov.dev.config.program_opcode, opcodes::WR_VLOCK);
        }
        assert_eq!(dev.config.program_opcode, opcodes::PP);
    }
}
