use i8008_utils::{assemble, AssembleError};

use crate::common::{check_address, mask_address, Memory, RequestError, MEMORY_SIZE};

use super::{Core, Operand};

/// The host's 16K of RAM.
#[derive(Clone)]
pub struct Ram {
    bytes: [u8; MEMORY_SIZE],
}

impl Ram {
    pub fn new() -> Self {
        Self {
            bytes: [0; MEMORY_SIZE],
        }
    }

    /// RAM with `program` loaded at address 0. Anything past the end of memory is dropped.
    pub fn new_with_program(program: &[u8]) -> Self {
        let mut this = Self::new();
        this.load_program(program);
        this
    }

    pub fn new_with_asm(code: &str) -> Result<Self, AssembleError> {
        let program = assemble(code)?;
        Ok(Self::new_with_program(&program))
    }

    pub fn load_program(&mut self, program: &[u8]) {
        self.clear();

        for (cell, byte) in self.bytes.iter_mut().zip(program) {
            *cell = *byte;
        }
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

// Indexing is bounds-checked: an address that escaped masking panics instead of aliasing.
impl Memory for Ram {
    type AddressSpace = u16;

    fn read_byte(&self, addr: Self::AddressSpace) -> u8 {
        self.bytes[addr as usize]
    }

    fn write_byte(&mut self, addr: Self::AddressSpace, byte: u8) {
        self.bytes[addr as usize] = byte;
    }
}

impl<'m, M: Memory<AddressSpace = u16>> Core<'m, M> {
    pub fn memory(&self) -> &M {
        &*self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut *self.memory
    }

    /// Reads a byte on behalf of the driver. Out-of-range addresses are rejected.
    pub fn peek(&self, address: usize) -> Result<u8, RequestError> {
        let address = check_address(address)?;
        Ok(self.memory.read_byte(address))
    }

    /// Writes a byte on behalf of the driver. Out-of-range addresses are rejected.
    pub fn poke(&mut self, address: usize, value: u8) -> Result<(), RequestError> {
        let address = check_address(address)?;
        self.memory.write_byte(address, value);
        Ok(())
    }

    /// Reads the byte at the program counter, without advancing it.
    pub(super) fn read_at_pc(&self) -> u8 {
        self.memory.read_byte(mask_address(self.program_counter))
    }

    /// Reads the byte at the program counter, and moves past it.
    pub(super) fn fetch_byte(&mut self) -> u8 {
        let byte = self.read_at_pc();
        self.program_counter = mask_address(self.program_counter.wrapping_add(1));
        byte
    }

    /// Fetches a little-endian address, low byte first.
    pub(super) fn fetch_address(&mut self) -> u16 {
        let lo = self.fetch_byte();
        let hi = self.fetch_byte();
        mask_address(u16::from_le_bytes([lo, hi]))
    }

    pub(super) fn read_operand(&self, operand: Operand) -> u8 {
        match operand {
            Operand::Register(register) => self.registers[register],
            Operand::Memory => self.memory.read_byte(mask_address(self.registers.m())),
        }
    }

    pub(super) fn write_operand(&mut self, operand: Operand, value: u8) {
        match operand {
            Operand::Register(register) => self.registers[register] = value,
            Operand::Memory => self.memory.write_byte(mask_address(self.registers.m()), value),
        }
    }
}
