//! User-mode SPI command framing on the AST2400 FMC
//!
//! [`SpiController`] hand-builds each flash command: assert CS#, clock out
//! the opcode and the 4-byte big-endian address through the data port, move
//! data, deassert CS#. It is generic over [`Mmio`] so the exact byte stream
//! can be asserted in tests without hardware.

use crate::physmap::PhysMap;
use crate::regs::{self, Ce0Ctrl};
use bootlock_core::opcodes;
use log::debug;

/// Raw access to a mapped register window
pub trait Mmio {
    fn read8(&self, offset: usize) -> u8;
    fn read16(&self, offset: usize) -> u16;
    fn read32(&self, offset: usize) -> u32;
    fn write8(&self, offset: usize, value: u8);
    fn write16(&self, offset: usize, value: u16);
    fn write32(&self, offset: usize, value: u32);
}

impl Mmio for PhysMap {
    fn read8(&self, offset: usize) -> u8 {
        PhysMap::read8(self, offset)
    }

    fn read16(&self, offset: usize) -> u16 {
        PhysMap::read16(self, offset)
    }

    fn read32(&self, offset: usize) -> u32 {
        PhysMap::read32(self, offset)
    }

    fn write8(&self, offset: usize, value: u8) {
        PhysMap::write8(self, offset, value)
    }

    fn write16(&self, offset: usize, value: u16) {
        PhysMap::write16(self, offset, value)
    }

    fn write32(&self, offset: usize, value: u32) {
        PhysMap::write32(self, offset, value)
    }
}

/// CE0 in user mode: control register plus flash data port
pub struct SpiController<M: Mmio> {
    ctrl: M,
    flash: M,
    clock_div: u8,
}

impl<M: Mmio> SpiController<M> {
    /// `clock_div` goes into the controller's clock divider field. 6 (/4)
    /// is the fastest that has proven reliable; higher speeds have confused
    /// the flash during bring-up, so tune with care.
    pub fn new(ctrl: M, flash: M, clock_div: u8) -> Self {
        Self {
            ctrl,
            flash,
            clock_div,
        }
    }

    /// Hand CE0 back to the controller's automated command logic
    pub fn reset(&mut self) {
        self.ctrl.write32(regs::CE0_CTRL, 0);
    }

    fn ctrl_word(&self, cs_asserted: bool) -> u32 {
        let mut word = Ce0Ctrl::USER_MODE.bits()
            | (u32::from(self.clock_div) & regs::CLOCK_DIV_MASK) << regs::CLOCK_DIV_SHIFT;
        if !cs_asserted {
            word |= Ce0Ctrl::CS_INACTIVE.bits();
        }
        word
    }

    /// Toggle user-control mode. Enabling leaves CS# deasserted; disabling
    /// restores the controller default (hardware-sequenced, register 0).
    pub fn set_user_control(&mut self, enabled: bool) {
        if enabled {
            self.ctrl.write32(regs::CE0_CTRL, self.ctrl_word(false));
        } else {
            self.ctrl.write32(regs::CE0_CTRL, 0);
        }
    }

    /// Drive the CS# line; every command byte-stream must be bracketed by
    /// an assert/deassert pair
    pub fn set_chip_select(&mut self, asserted: bool) {
        self.ctrl.write32(regs::CE0_CTRL, self.ctrl_word(asserted));
    }

    fn send_address(&mut self, addr: u32) {
        // 4-byte addressing, most significant byte first
        for shift in [24u32, 16, 8, 0] {
            self.flash.write8(0, (addr >> shift) as u8);
        }
    }

    /// One complete command frame with no address or data (e.g. WREN)
    pub fn command(&mut self, opcode: u8) {
        self.set_chip_select(true);
        self.flash.write8(0, opcode);
        self.set_chip_select(false);
    }

    /// One complete read frame: opcode, 4-byte address, one response byte
    pub fn read_byte(&mut self, opcode: u8, addr: u32) -> u8 {
        self.set_chip_select(true);
        self.flash.write8(0, opcode);
        self.send_address(addr);
        let value = self.flash.read8(0);
        self.set_chip_select(false);
        value
    }

    /// Write-enable frame, then a frame carrying opcode + address + one
    /// data byte
    pub fn write_byte(&mut self, opcode: u8, addr: u32, data: u8) {
        debug!("user-mode write: op {:#04x} addr 0x{:08x}", opcode, addr);
        self.command(opcodes::WREN);
        self.set_chip_select(true);
        self.flash.write8(0, opcode);
        self.send_address(addr);
        self.flash.write8(0, data);
        self.set_chip_select(false);
    }

    /// Status register read
    pub fn read_status(&mut self) -> u8 {
        self.set_chip_select(true);
        self.flash.write8(0, opcodes::RDSR);
        let status = self.flash.read8(0);
        self.set_chip_select(false);
        status
    }

    /// Identification frame: the 3-byte JEDEC id arrives in the low bytes
    /// of a 32-bit data-port read
    pub fn identify(&mut self) -> u32 {
        self.set_chip_select(true);
        self.flash.write8(0, opcodes::RDID);
        let id = self.flash.read32(0) & 0x00ff_ffff;
        self.set_chip_select(false);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Access {
        Write8(&'static str, usize, u8),
        Write32(&'static str, usize, u32),
        Read8(&'static str, usize),
        Read32(&'static str, usize),
    }

    #[derive(Clone)]
    struct FakeMmio {
        name: &'static str,
        log: Rc<RefCell<Vec<Access>>>,
        read_data: Rc<RefCell<VecDeque<u32>>>,
    }

    impl FakeMmio {
        fn pair() -> (FakeMmio, FakeMmio, Rc<RefCell<Vec<Access>>>) {
            let log = Rc::new(RefCell::new(Vec::new()));
            let reads = Rc::new(RefCell::new(VecDeque::new()));
            let ctrl = FakeMmio {
                name: "ctrl",
                log: log.clone(),
                read_data: reads.clone(),
            };
            let flash = FakeMmio {
                name: "flash",
                log: log.clone(),
                read_data: reads,
            };
            (ctrl, flash, log)
        }

        fn queue_read(&self, value: u32) {
            self.read_data.borrow_mut().push_back(value);
        }
    }

    impl Mmio for FakeMmio {
        fn read8(&self, offset: usize) -> u8 {
            self.log.borrow_mut().push(Access::Read8(self.name, offset));
            self.read_data.borrow_mut().pop_front().unwrap_or(0) as u8
        }

        fn read16(&self, _offset: usize) -> u16 {
            unimplemented!("no 16-bit reads in the lock sequence")
        }

        fn read32(&self, offset: usize) -> u32 {
            self.log.borrow_mut().push(Access::Read32(self.name, offset));
            self.read_data.borrow_mut().pop_front().unwrap_or(0)
        }

        fn write8(&self, offset: usize, value: u8) {
            self.log
                .borrow_mut()
                .push(Access::Write8(self.name, offset, value));
        }

        fn write16(&self, _offset: usize, _value: u16) {
            unimplemented!("no 16-bit writes in the lock sequence")
        }

        fn write32(&self, offset: usize, value: u32) {
            self.log
                .borrow_mut()
                .push(Access::Write32(self.name, offset, value));
        }
    }

    const DIV: u8 = 6;
    const CS_ON: u32 = 0b11 | (DIV as u32) << 8;
    const CS_OFF: u32 = 0b11 | 1 << 2 | (DIV as u32) << 8;

    fn controller() -> (SpiController<FakeMmio>, Rc<RefCell<Vec<Access>>>) {
        let (ctrl, flash, log) = FakeMmio::pair();
        (SpiController::new(ctrl, flash, DIV), log)
    }

    #[test]
    fn read_byte_frames_one_command() {
        let (mut c, log) = controller();
        c.flash.queue_read(0xab);
        let value = c.read_byte(0xE8, 0x00010000);
        assert_eq!(value, 0xab);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                Access::Write32("ctrl", 0, CS_ON),
                Access::Write8("flash", 0, 0xE8),
                Access::Write8("flash", 0, 0x00),
                Access::Write8("flash", 0, 0x01),
                Access::Write8("flash", 0, 0x00),
                Access::Write8("flash", 0, 0x00),
                Access::Read8("flash", 0),
                Access::Write32("ctrl", 0, CS_OFF),
            ]
        );
    }

    #[test]
    fn write_byte_sends_write_enable_in_its_own_bracket() {
        let (mut c, log) = controller();
        c.write_byte(0xE5, 0x00070000, 0b11);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                // WREN frame
                Access::Write32("ctrl", 0, CS_ON),
                Access::Write8("flash", 0, 0x06),
                Access::Write32("ctrl", 0, CS_OFF),
                // lock-bit frame
                Access::Write32("ctrl", 0, CS_ON),
                Access::Write8("flash", 0, 0xE5),
                Access::Write8("flash", 0, 0x00),
                Access::Write8("flash", 0, 0x07),
                Access::Write8("flash", 0, 0x00),
                Access::Write8("flash", 0, 0x00),
                Access::Write8("flash", 0, 0b11),
                Access::Write32("ctrl", 0, CS_OFF),
            ]
        );
    }

    #[test]
    fn identify_masks_to_24_bits() {
        let (mut c, log) = controller();
        c.flash.queue_read(0xff20ba20);
        assert_eq!(c.identify(), 0x20ba20);
        assert!(log
            .borrow()
            .contains(&Access::Write8("flash", 0, 0x9F)));
        assert!(log.borrow().contains(&Access::Read32("flash", 0)));
    }

    #[test]
    fn disabling_user_control_restores_controller_default() {
        let (mut c, log) = controller();
        c.set_user_control(true);
        c.set_user_control(false);
        assert_eq!(
            log.borrow().as_slice(),
            &[
                Access::Write32("ctrl", 0, CS_OFF),
                Access::Write32("ctrl", 0, 0),
            ]
        );
    }
}
