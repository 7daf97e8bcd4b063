use crate::{common::{Fault, Memory}, stack::Stack};

/// The 8008 engine. Memory belongs to the host and is borrowed for the engine's lifetime.
pub struct Core<'m, M: Memory<AddressSpace = u16>> {
    /// Only the low 14 bits are significant; every fetch masks it.
    pub program_counter: u16,
    pub registers: Registers,
    pub flags: Flags,
    pub stack: Stack,
    memory: &'m mut M,
    halted: bool,
    last_fault: Option<Fault>,
}

impl<'m, M: Memory<AddressSpace = u16>> Core<'m, M> {
    /// Creates a zeroed engine over `memory`. It starts halted, until first stepped.
    pub fn new(memory: &'m mut M) -> Self {
        Self {
            program_counter: 0,
            registers: Registers::new(),
            flags: Flags::default(),
            stack: Stack::new(),
            memory,
            halted: true,
            last_fault: None,
        }
    }

    pub fn register(&self, register: Register) -> u8 {
        self.registers[register]
    }

    pub fn set_register(&mut self, register: Register, value: u8) {
        self.registers[register] = value;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The fault raised by the most recently executed instruction, if any.
    pub fn last_fault(&self) -> Option<Fault> {
        self.last_fault
    }
}

mod alu;
pub use alu::*;

mod decode;
pub use decode::*;

mod registers;
pub use registers::*;

mod exec;

mod mem;
pub use mem::*;
