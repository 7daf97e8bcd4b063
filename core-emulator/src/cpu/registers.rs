use std::ops::{Index, IndexMut};

/// The seven addressable scratchpad registers, in opcode order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

impl Register {
    pub const ALL: [Register; 7] = [
        Register::A,
        Register::B,
        Register::C,
        Register::D,
        Register::E,
        Register::H,
        Register::L,
    ];

    /// Resolves a 3-bit register code. Code `111` is memory at M, so yields `None`.
    pub fn from_code(code: u8) -> Option<Register> {
        Self::ALL.get((code & 0b111) as usize).copied()
    }

    pub fn name(self) -> char {
        match self {
            Register::A => 'A',
            Register::B => 'B',
            Register::C => 'C',
            Register::D => 'D',
            Register::E => 'E',
            Register::H => 'H',
            Register::L => 'L',
        }
    }
}

/// Where an instruction's 3-bit register field points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    Register(Register),

    /// The byte in memory addressed by M.
    Memory,
}

impl Operand {
    pub fn from_code(code: u8) -> Operand {
        Register::from_code(code).map_or(Operand::Memory, Operand::Register)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registers {
    cells: [u8; 7],
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    /// The M pseudo-register: low 6 bits of H followed by all of L.
    pub fn m(&self) -> u16 {
        (u16::from(self[Register::H] & 0b0011_1111) << 8) | u16::from(self[Register::L])
    }
}

impl Index<Register> for Registers {
    type Output = u8;

    fn index(&self, register: Register) -> &u8 {
        &self.cells[register as usize]
    }
}

impl IndexMut<Register> for Registers {
    fn index_mut(&mut self, register: Register) -> &mut u8 {
        &mut self.cells[register as usize]
    }
}

/// The four condition flip-flops. They are independent latches, not a packed register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    pub carry: bool,
    pub zero: bool,
    pub sign: bool,
    pub parity: bool,
}

/// Flags in the order of the 2-bit condition code used by jumps, calls and returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flag {
    Carry,
    Zero,
    Sign,
    Parity,
}

impl Flag {
    pub fn from_code(code: u8) -> Flag {
        match code & 0b11 {
            0b00 => Flag::Carry,
            0b01 => Flag::Zero,
            0b10 => Flag::Sign,
            _ => Flag::Parity,
        }
    }
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Carry => self.carry,
            Flag::Zero => self.zero,
            Flag::Sign => self.sign,
            Flag::Parity => self.parity,
        }
    }

    /// Sets sign, zero and parity from an 8-bit result. Carry is left alone.
    pub fn update_from_result(&mut self, result: u8) {
        self.sign = result & 0b1000_0000 != 0;
        self.zero = result == 0;
        self.parity = result.count_ones() % 2 == 0;
    }
}

/// A flag test taken from bits 3-5 of a conditional jump, call or return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Condition {
    pub flag: Flag,
    pub expected: bool,
}

impl Condition {
    //   .- Sense: 1 = "if true", 0 = "if false"
    //   |.-. Flag selector
    // 0bxxSFFxxx
    pub fn from_opcode(opcode: u8) -> Condition {
        Condition {
            flag: Flag::from_code((opcode >> 3) & 0b11),
            expected: (opcode >> 5) & 1 == 1,
        }
    }

    pub fn holds(&self, flags: &Flags) -> bool {
        flags.get(self.flag) == self.expected
    }
}

#[cfg(test)]
mod test {
    use super::{Condition, Flag, Flags, Operand, Register, Registers};

    #[test]
    fn test_register_codes() {
        assert_eq!(Register::from_code(0b000), Some(Register::A));
        assert_eq!(Register::from_code(0b110), Some(Register::L));
        assert_eq!(Register::from_code(0b111), None);
        assert_eq!(Operand::from_code(0b111), Operand::Memory);
        assert_eq!(Operand::from_code(0b011), Operand::Register(Register::D));
    }

    #[test]
    fn test_m_pointer() {
        let mut registers = Registers::new();
        registers[Register::H] = 0xFF;
        registers[Register::L] = 0x34;
        assert_eq!(registers.m(), 0x3F34);

        registers[Register::H] = 0x12;
        registers[Register::L] = 0x00;
        assert_eq!(registers.m(), 0x1200);
    }

    #[test]
    fn test_flags_from_result() {
        let mut flags = Flags { carry: true, ..Flags::default() };

        flags.update_from_result(0x00);
        assert_eq!(flags, Flags { carry: true, zero: true, sign: false, parity: true });

        flags.update_from_result(0x80);
        assert_eq!(flags, Flags { carry: true, zero: false, sign: true, parity: false });

        flags.update_from_result(0x03);
        assert_eq!(flags, Flags { carry: true, zero: false, sign: false, parity: true });
    }

    #[test]
    fn test_condition_decoding() {
        // JTZ
        assert_eq!(Condition::from_opcode(0x68), Condition { flag: Flag::Zero, expected: true });
        // RFC
        assert_eq!(Condition::from_opcode(0x03), Condition { flag: Flag::Carry, expected: false });
        // CTP
        assert_eq!(Condition::from_opcode(0x7A), Condition { flag: Flag::Parity, expected: true });

        let flags = Flags { sign: true, ..Flags::default() };
        assert!(Condition { flag: Flag::Sign, expected: true }.holds(&flags));
        assert!(Condition { flag: Flag::Carry, expected: false }.holds(&flags));
        assert!(!Condition { flag: Flag::Sign, expected: false }.holds(&flags));
    }
}
