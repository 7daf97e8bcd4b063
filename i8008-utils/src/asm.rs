//! A small two-pass assembler for the original Intel 8008 mnemonics.
//!
//! Source is a stream of whitespace-separated tokens, so a whole program can
//! sit on one line (`"LAI 05 ADI 03 HLT"`). All numbers are hexadecimal, with
//! an optional `0x` prefix. `;` starts a comment that runs to the end of the line.
//!
//! Besides instructions, the following are understood:
//!
//! - `name:` defines a label at the current address
//! - `@name` refers to a label, wherever an address operand is expected
//! - `DB xx` emits one raw byte
//! - `ORG xxxx` moves the current address forward, padding with zeroes

use std::collections::HashMap;

use thiserror::Error;

/// Largest image the assembler will produce, matching the 14-bit address space.
pub const MAX_PROGRAM_SIZE: usize = 0x4000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),

    #[error("'{0}' expects an operand")]
    MissingOperand(String),

    #[error("invalid operand '{operand}' for '{mnemonic}'")]
    InvalidOperand { mnemonic: String, operand: String },

    #[error("undefined label '{0}'")]
    UndefinedLabel(String),

    #[error("label '{0}' is defined more than once")]
    DuplicateLabel(String),

    #[error("ORG {target:#06x} is behind the current address {current:#06x}")]
    OrgBackwards { target: usize, current: usize },

    #[error("program does not fit in the 16K address space")]
    TooLarge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OperandKind {
    None,
    Byte,
    Address,
    /// Restart vector index, ORed into bits 3-5.
    Restart,
    /// Port number, ORed into bits 1-5.
    Port { min: u8, max: u8 },
}

const ALU_PREFIXES: [&[u8; 2]; 8] = [b"AD", b"AC", b"SU", b"SB", b"ND", b"XR", b"OR", b"CP"];

fn register_code(letter: u8) -> Option<u8> {
    match letter {
        b'A' => Some(0),
        b'B' => Some(1),
        b'C' => Some(2),
        b'D' => Some(3),
        b'E' => Some(4),
        b'H' => Some(5),
        b'L' => Some(6),
        b'M' => Some(7),
        _ => None,
    }
}

fn condition_code(sense: u8, flag: u8) -> Option<u8> {
    let sense = match sense {
        b'F' => 0,
        b'T' => 1,
        _ => return None,
    };
    let flag = match flag {
        b'C' => 0,
        b'Z' => 1,
        b'S' => 2,
        b'P' => 3,
        _ => return None,
    };
    Some(sense << 5 | flag << 3)
}

fn alu_code(prefix: [u8; 2]) -> Option<u8> {
    ALU_PREFIXES.iter().position(|p| **p == prefix).map(|i| i as u8)
}

/// Maps a mnemonic to its base opcode and the kind of operand that follows it.
fn encode(mnemonic: &str) -> Option<(u8, OperandKind)> {
    use OperandKind::*;

    let fixed = match mnemonic {
        "HLT" => Some((0x00, None)),
        "RLC" => Some((0x02, None)),
        "RRC" => Some((0x0A, None)),
        "RAL" => Some((0x12, None)),
        "RAR" => Some((0x1A, None)),
        "RET" => Some((0x07, None)),
        "RST" => Some((0x05, Restart)),
        "JMP" => Some((0x44, Address)),
        "CAL" => Some((0x46, Address)),
        "INP" => Some((0x41, Port { min: 0, max: 7 })),
        "OUT" => Some((0x41, Port { min: 8, max: 31 })),
        _ => Option::None,
    };
    if fixed.is_some() {
        return fixed;
    }

    let &[a, b, c] = mnemonic.as_bytes() else {
        return Option::None;
    };

    match (a, b, c) {
        (b'R', s, f) => condition_code(s, f).map(|cc| (0x03 | cc, None)),
        (b'J', s, f) => condition_code(s, f).map(|cc| (0x40 | cc, Address)),
        (b'C', s @ (b'F' | b'T'), f) => condition_code(s, f).map(|cc| (0x42 | cc, Address)),

        // A and M are not valid targets: 0x00/0x01 are HLT, 0x38/0x39 are undefined
        (b'I', b'N', r) => register_code(r)
            .filter(|r| (1..=6).contains(r))
            .map(|r| (r << 3, None)),
        (b'D', b'C', r) => register_code(r)
            .filter(|r| (1..=6).contains(r))
            .map(|r| (0x01 | r << 3, None)),

        (b'L', d, b'I') => register_code(d).map(|d| (0x06 | d << 3, Byte)),
        (b'L', d, s) => match (register_code(d), register_code(s)) {
            // LMM would be 0xFF, which is HLT
            (Some(7), Some(7)) => Option::None,
            (Some(d), Some(s)) => Some((0xC0 | d << 3 | s, None)),
            _ => Option::None,
        },

        (a, b, b'I') => alu_code([a, b]).map(|op| (0x04 | op << 3, Byte)),
        (a, b, r) => match (alu_code([a, b]), register_code(r)) {
            (Some(op), Some(r)) => Some((0x80 | op << 3 | r, None)),
            _ => Option::None,
        },
    }
}

fn parse_number(token: &str) -> Option<u32> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    u32::from_str_radix(digits, 16).ok()
}

struct Assembler {
    output: Vec<u8>,
    labels: HashMap<String, u16>,
    fixups: Vec<(usize, String)>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            output: vec![],
            labels: HashMap::new(),
            fixups: vec![],
        }
    }

    fn emit(&mut self, byte: u8) -> Result<(), AssembleError> {
        if self.output.len() >= MAX_PROGRAM_SIZE {
            return Err(AssembleError::TooLarge);
        }
        self.output.push(byte);
        Ok(())
    }

    fn emit_address(&mut self, mnemonic: &str, operand: &str) -> Result<(), AssembleError> {
        if let Some(label) = operand.strip_prefix('@') {
            self.fixups.push((self.output.len(), label.to_string()));
            self.emit(0)?;
            return self.emit(0);
        }

        let address = parse_number(operand)
            .filter(|n| (*n as usize) < MAX_PROGRAM_SIZE)
            .ok_or_else(|| invalid_operand(mnemonic, operand))?;
        let [lo, hi] = (address as u16).to_le_bytes();
        self.emit(lo)?;
        self.emit(hi)
    }

    fn define_label(&mut self, name: &str) -> Result<(), AssembleError> {
        let address = self.output.len() as u16;
        if self.labels.insert(name.to_string(), address).is_some() {
            return Err(AssembleError::DuplicateLabel(name.to_string()));
        }
        Ok(())
    }

    fn org(&mut self, operand: &str) -> Result<(), AssembleError> {
        let target = parse_number(operand).ok_or_else(|| invalid_operand("ORG", operand))? as usize;
        let current = self.output.len();
        if target < current {
            return Err(AssembleError::OrgBackwards { target, current });
        }
        if target > MAX_PROGRAM_SIZE {
            return Err(AssembleError::TooLarge);
        }
        self.output.resize(target, 0);
        Ok(())
    }

    fn resolve_fixups(&mut self) -> Result<(), AssembleError> {
        for (position, label) in &self.fixups {
            let address = self
                .labels
                .get(label)
                .ok_or_else(|| AssembleError::UndefinedLabel(label.clone()))?;
            let [lo, hi] = address.to_le_bytes();
            self.output[*position] = lo;
            self.output[*position + 1] = hi;
        }
        Ok(())
    }
}

fn invalid_operand(mnemonic: &str, operand: &str) -> AssembleError {
    AssembleError::InvalidOperand {
        mnemonic: mnemonic.to_string(),
        operand: operand.to_string(),
    }
}

/// Assembles 8008 source into a memory image starting at address 0.
///
/// ```
/// let rom = i8008_utils::assemble("LAI 05 ADI 03 HLT").unwrap();
/// assert_eq!(rom, vec![0x06, 0x05, 0x04, 0x03, 0x00]);
/// ```
pub fn assemble(code: &str) -> Result<Vec<u8>, AssembleError> {
    let mut asm = Assembler::new();

    let mut tokens = code
        .lines()
        .flat_map(|line| line.split(';').next().unwrap_or("").split_whitespace());

    while let Some(token) = tokens.next() {
        if let Some(label) = token.strip_suffix(':') {
            asm.define_label(label)?;
            continue;
        }

        let mnemonic = token.to_ascii_uppercase();
        let mut operand = || {
            tokens
                .next()
                .ok_or_else(|| AssembleError::MissingOperand(mnemonic.clone()))
        };

        match mnemonic.as_str() {
            "DB" => {
                let operand = operand()?;
                let byte = parse_number(operand)
                    .filter(|n| *n <= 0xFF)
                    .ok_or_else(|| invalid_operand("DB", operand))?;
                asm.emit(byte as u8)?;
            }
            "ORG" => {
                let operand = operand()?;
                asm.org(operand)?;
            }
            _ => {
                let (opcode, kind) = encode(&mnemonic)
                    .ok_or_else(|| AssembleError::UnknownMnemonic(token.to_string()))?;

                match kind {
                    OperandKind::None => asm.emit(opcode)?,
                    OperandKind::Byte => {
                        let operand = operand()?;
                        let byte = parse_number(operand)
                            .filter(|n| *n <= 0xFF)
                            .ok_or_else(|| invalid_operand(&mnemonic, operand))?;
                        asm.emit(opcode)?;
                        asm.emit(byte as u8)?;
                    }
                    OperandKind::Address => {
                        let operand = operand()?;
                        asm.emit(opcode)?;
                        asm.emit_address(&mnemonic, operand)?;
                    }
                    OperandKind::Restart => {
                        let operand = operand()?;
                        let vector = parse_number(operand)
                            .filter(|n| *n <= 7)
                            .ok_or_else(|| invalid_operand(&mnemonic, operand))?;
                        asm.emit(opcode | (vector as u8) << 3)?;
                    }
                    OperandKind::Port { min, max } => {
                        let operand = operand()?;
                        let port = parse_number(operand)
                            .filter(|n| (min as u32..=max as u32).contains(n))
                            .ok_or_else(|| invalid_operand(&mnemonic, operand))?;
                        asm.emit(opcode | (port as u8) << 1)?;
                    }
                }
            }
        }
    }

    asm.resolve_fixups()?;
    Ok(asm.output)
}
