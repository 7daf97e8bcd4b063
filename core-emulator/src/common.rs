use num_traits::{ops::overflowing::OverflowingAdd, Num, One};
use thiserror::Error;

/// The 8008 drives 14 address lines.
pub const ADDRESS_MASK: u16 = 0x3FFF;

pub const MEMORY_SIZE: usize = ADDRESS_MASK as usize + 1;

pub fn mask_address(address: u16) -> u16 {
    address & ADDRESS_MASK
}

/// Faults raised by guest code. None of these stop execution.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("unknown opcode {opcode:#04x} at {address:#06x}")]
    UnknownOpcode { opcode: u8, address: u16 },

    #[error("stack is full, can't push {address:#06x}")]
    StackOverflow { address: u16 },

    #[error("stack is empty, popping program counter")]
    StackUnderflow,
}

/// Invalid requests coming from the driver, rejected before they touch any state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("address {0:#x} out of range, valid addresses are 0-3fff")]
    AddressOutOfRange(usize),

    #[error("value {0:#x} out of range, valid values are 0-ff")]
    ValueOutOfRange(u32),

    #[error("stack pointer {0} out of range, valid values are 0-8")]
    StackPointerOutOfRange(usize),
}

pub fn check_address(address: usize) -> Result<u16, RequestError> {
    if address < MEMORY_SIZE {
        Ok(address as u16)
    } else {
        Err(RequestError::AddressOutOfRange(address))
    }
}

pub fn check_byte(value: u32) -> Result<u8, RequestError> {
    u8::try_from(value).map_err(|_| RequestError::ValueOutOfRange(value))
}

pub trait Memory {
    type AddressSpace: Copy + Num + OverflowingAdd;

    fn read_byte(&self, addr: Self::AddressSpace) -> u8;
    fn write_byte(&mut self, addr: Self::AddressSpace, byte: u8);

    fn read_bytes(&self, addr: Self::AddressSpace, len: usize) -> Vec<u8> {
        let mut addr = addr;
        let mut bytes = Vec::with_capacity(len);
        for _ in 0..len {
            bytes.push(self.read_byte(addr));
            addr = addr.overflowing_add(&One::one()).0;
        }
        bytes
    }

    fn write_bytes(&mut self, addr: Self::AddressSpace, bytes: &[u8]) {
        let mut addr = addr;
        for byte in bytes {
            self.write_byte(addr, *byte);
            addr = addr.overflowing_add(&One::one()).0;
        }
    }
}
