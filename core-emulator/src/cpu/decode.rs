use super::{
    alu::{AluOp, RotateOp},
    registers::{Condition, Operand, Register},
};

/// An opcode, classified. Operand bytes that follow in memory are not part of this;
/// they are fetched while the instruction executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// HLT, either `0000000x` or `11111111`.
    Halt,

    /// INr. Never targets M.
    Increment(Register),

    /// DCr. Never targets M.
    Decrement(Register),

    /// ADI, ACI, SUI, SBI, NDI, XRI, ORI, CPI + immediate byte.
    AluImmediate(AluOp),

    /// LrI / LMI + immediate byte.
    LoadImmediate(Operand),

    /// RLC, RRC, RAL, RAR.
    Rotate(RotateOp),

    Return,
    ReturnIf(Condition),

    /// RST: call into one of the eight vectors at multiples of 8.
    Restart(u16),

    /// JMP + address.
    Jump,
    JumpIf(Condition),

    /// CAL + address.
    Call,
    CallIf(Condition),

    /// INP / OUT. Recognised, but ports are not emulated.
    InputOutput { port: u8 },

    /// ADr .. CPr, ADM .. CPM.
    Alu(AluOp, Operand),

    /// LrM.
    LoadFromMemory(Register),

    /// LMr.
    StoreToMemory(Register),

    /// Lr1r2: copy `src` into `dest`.
    Move { dest: Register, src: Register },

    Unknown,
}

//
//   .-. Group
//   ||.-.-. Middle: destination / operation / condition / vector
//   |||||.-.-. Low: source / instruction form
// 0bGGMMMLLL
//
pub fn decode(opcode: u8) -> Instruction {
    let middle = (opcode >> 3) & 0b111;
    let low = opcode & 0b111;

    match opcode >> 6 {
        0b00 => decode_register_immediate_control(opcode, middle, low),
        0b01 => decode_jump_call(opcode, middle, low),
        0b10 => Instruction::Alu(AluOp::from_code(middle), Operand::from_code(low)),
        _ => decode_move(middle, low),
    }
}

fn decode_register_immediate_control(opcode: u8, middle: u8, low: u8) -> Instruction {
    // The lowest bit doesn't matter for HLT
    if opcode & 0b1111_1110 == 0 {
        return Instruction::Halt;
    }

    match (low, Register::from_code(middle)) {
        (0b000, Some(register)) => Instruction::Increment(register),
        (0b001, Some(register)) => Instruction::Decrement(register),
        (0b100, _) => Instruction::AluImmediate(AluOp::from_code(middle)),
        (0b110, _) => Instruction::LoadImmediate(Operand::from_code(middle)),
        (0b010, _) => RotateOp::from_code(middle).map_or(Instruction::Unknown, Instruction::Rotate),
        (0b111, _) => Instruction::Return,
        (0b011, _) => Instruction::ReturnIf(Condition::from_opcode(opcode)),
        (0b101, _) => Instruction::Restart(u16::from(middle) << 3),
        _ => Instruction::Unknown,
    }
}

fn decode_jump_call(opcode: u8, middle: u8, low: u8) -> Instruction {
    match low {
        0b100 => Instruction::Jump,
        0b000 => Instruction::JumpIf(Condition::from_opcode(opcode)),
        0b110 => Instruction::Call,
        0b010 => Instruction::CallIf(Condition::from_opcode(opcode)),
        _ if opcode & 1 == 1 => Instruction::InputOutput { port: (middle << 2) | (low >> 1) },
        _ => Instruction::Unknown,
    }
}

fn decode_move(middle: u8, low: u8) -> Instruction {
    match (Register::from_code(middle), Register::from_code(low)) {
        // LMM's encoding is the second HLT
        (None, None) => Instruction::Halt,
        (Some(dest), None) => Instruction::LoadFromMemory(dest),
        (None, Some(src)) => Instruction::StoreToMemory(src),
        (Some(dest), Some(src)) => Instruction::Move { dest, src },
    }
}
