/// The eight accumulator operations, in the order of the opcode's middle 3 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    Add,
    AddWithCarry,
    Subtract,
    SubtractWithBorrow,
    And,
    Xor,
    Or,
    Compare,
}

impl AluOp {
    pub fn from_code(code: u8) -> AluOp {
        match code & 0b111 {
            0b000 => AluOp::Add,
            0b001 => AluOp::AddWithCarry,
            0b010 => AluOp::Subtract,
            0b011 => AluOp::SubtractWithBorrow,
            0b100 => AluOp::And,
            0b101 => AluOp::Xor,
            0b110 => AluOp::Or,
            _ => AluOp::Compare,
        }
    }

    /// Compare only sets flags; everything else writes the accumulator.
    pub fn stores_result(self) -> bool {
        self != AluOp::Compare
    }

    /// Computes `accumulator <op> operand`.
    ///
    /// The returned carry is `Some` for the add/subtract family (the unsigned
    /// overflow or borrow) and `Some(false)` for AND/XOR/OR. Compare returns
    /// `None`, because what it does to carry depends on the instruction group.
    pub fn evaluate(self, accumulator: u8, operand: u8, carry_in: bool) -> (u8, Option<bool>) {
        let a = u16::from(accumulator);
        let b = u16::from(operand);
        let c = u16::from(carry_in);

        match self {
            AluOp::Add => add(a, b),
            AluOp::AddWithCarry => add(a, b + c),
            AluOp::Subtract => subtract(a, b),
            AluOp::SubtractWithBorrow => subtract(a, b + c),
            AluOp::And => (accumulator & operand, Some(false)),
            AluOp::Xor => (accumulator ^ operand, Some(false)),
            AluOp::Or => (accumulator | operand, Some(false)),
            AluOp::Compare => (subtract(a, b).0, None),
        }
    }
}

fn add(a: u16, b: u16) -> (u8, Option<bool>) {
    let sum = a + b;
    (sum as u8, Some(sum > 0xFF))
}

fn subtract(a: u16, b: u16) -> (u8, Option<bool>) {
    (a.wrapping_sub(b) as u8, Some(a < b))
}

/// Accumulator rotates, in the order of the opcode's middle 3 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RotateOp {
    /// RLC: bit 7 goes to bit 0 and to carry.
    Left,
    /// RRC: bit 0 goes to bit 7 and to carry.
    Right,
    /// RAL: carry goes to bit 0, bit 7 goes to carry.
    LeftThroughCarry,
    /// RAR: carry goes to bit 7, bit 0 goes to carry.
    RightThroughCarry,
}

impl RotateOp {
    pub fn from_code(code: u8) -> Option<RotateOp> {
        match code {
            0b000 => Some(RotateOp::Left),
            0b001 => Some(RotateOp::Right),
            0b010 => Some(RotateOp::LeftThroughCarry),
            0b011 => Some(RotateOp::RightThroughCarry),
            _ => None,
        }
    }

    /// Returns the rotated value and the new carry.
    pub fn apply(self, value: u8, carry: bool) -> (u8, bool) {
        let high = value >> 7;
        let low = value & 1;

        match self {
            RotateOp::Left => (value << 1 | high, high == 1),
            RotateOp::Right => (value >> 1 | low << 7, low == 1),
            RotateOp::LeftThroughCarry => (value << 1 | u8::from(carry), high == 1),
            RotateOp::RightThroughCarry => (value >> 1 | u8::from(carry) << 7, low == 1),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AluOp, RotateOp};

    #[test]
    fn test_add() {
        assert_eq!(AluOp::Add.evaluate(0x05, 0x03, true), (0x08, Some(false)));
        assert_eq!(AluOp::Add.evaluate(0xF0, 0x20, false), (0x10, Some(true)));
        assert_eq!(AluOp::Add.evaluate(0xFF, 0x01, false), (0x00, Some(true)));
    }

    #[test]
    fn test_add_with_carry() {
        assert_eq!(AluOp::AddWithCarry.evaluate(0x05, 0x03, true), (0x09, Some(false)));
        assert_eq!(AluOp::AddWithCarry.evaluate(0xFF, 0x00, true), (0x00, Some(true)));
    }

    #[test]
    fn test_subtract() {
        assert_eq!(AluOp::Subtract.evaluate(0x05, 0x03, true), (0x02, Some(false)));
        assert_eq!(AluOp::Subtract.evaluate(0x03, 0x05, false), (0xFE, Some(true)));
        assert_eq!(AluOp::Subtract.evaluate(0x05, 0x05, false), (0x00, Some(false)));
    }

    #[test]
    fn test_subtract_with_borrow() {
        assert_eq!(AluOp::SubtractWithBorrow.evaluate(0x05, 0x03, true), (0x01, Some(false)));
        assert_eq!(AluOp::SubtractWithBorrow.evaluate(0x05, 0x05, true), (0xFF, Some(true)));
        assert_eq!(AluOp::SubtractWithBorrow.evaluate(0x00, 0xFF, true), (0x00, Some(true)));
    }

    #[test]
    fn test_logic_clears_carry() {
        assert_eq!(AluOp::And.evaluate(0b1100, 0b1010, true), (0b1000, Some(false)));
        assert_eq!(AluOp::Xor.evaluate(0b1100, 0b1010, true), (0b0110, Some(false)));
        assert_eq!(AluOp::Or.evaluate(0b1100, 0b1010, true), (0b1110, Some(false)));
    }

    #[test]
    fn test_compare() {
        assert_eq!(AluOp::Compare.evaluate(0x10, 0x10, true), (0x00, None));
        assert_eq!(AluOp::Compare.evaluate(0x10, 0x20, false), (0xF0, None));
        assert!(!AluOp::Compare.stores_result());
        assert!(AluOp::Or.stores_result());
    }

    #[test]
    fn test_rotates() {
        assert_eq!(RotateOp::Left.apply(0b1000_0001, false), (0b0000_0011, true));
        assert_eq!(RotateOp::Right.apply(0b1000_0001, false), (0b1100_0000, true));
        assert_eq!(RotateOp::LeftThroughCarry.apply(0b1000_0000, false), (0b0000_0000, true));
        assert_eq!(RotateOp::LeftThroughCarry.apply(0b0100_0000, true), (0b1000_0001, false));
        assert_eq!(RotateOp::RightThroughCarry.apply(0b0000_0001, false), (0b0000_0000, true));
        assert_eq!(RotateOp::RightThroughCarry.apply(0b0000_0010, true), (0b1000_0001, false));
        assert_eq!(RotateOp::from_code(0b100), None);
    }
}
