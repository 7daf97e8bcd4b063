//! Property-based tests for the engine's invariants.

use i8008_core_emulator::{
    AluOp, Core, Fault, Flags, Memory, Ram, Register, Stack, MEMORY_SIZE, STACK_CAPACITY,
};
use proptest::prelude::*;

fn register() -> impl Strategy<Value = Register> {
    prop::sample::select(Register::ALL.to_vec())
}

proptest! {
    #[test]
    fn memory_write_then_read(addr in 0..MEMORY_SIZE as u16, value: u8) {
        let mut ram = Ram::new();
        ram.write_byte(addr, value);
        prop_assert_eq!(ram.read_byte(addr), value);

        let mut core = Core::new(&mut ram);
        core.poke(addr as usize, value.wrapping_add(1)).unwrap();
        prop_assert_eq!(core.peek(addr as usize), Ok(value.wrapping_add(1)));
    }

    #[test]
    fn out_of_range_poke_changes_nothing(addr in MEMORY_SIZE..0x10000usize, value: u8) {
        let mut ram = Ram::new();
        let mut core = Core::new(&mut ram);
        prop_assert!(core.poke(addr, value).is_err());
        prop_assert!(ram.bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn flags_follow_result(result: u8, carry: bool) {
        let mut flags = Flags { carry, ..Flags::default() };
        flags.update_from_result(result);

        prop_assert_eq!(flags.zero, result == 0);
        prop_assert_eq!(flags.sign, result & 0x80 != 0);
        prop_assert_eq!(flags.parity, result.count_ones() % 2 == 0);
        prop_assert_eq!(flags.carry, carry);
    }

    #[test]
    fn add_register_carries_past_255(a: u8, b: u8) {
        // LAI a, LBI b, ADB
        let mut ram = Ram::new_with_program(&[0x06, a, 0x0E, b, 0x81]);
        let mut core = Core::new(&mut ram);
        core.execute_until_halt(3);

        let sum = u16::from(a) + u16::from(b);
        prop_assert_eq!(core.register(Register::A), sum as u8);
        prop_assert_eq!(core.flags.carry, sum > 0xFF);
        prop_assert_eq!(core.register(Register::B), b);
    }

    #[test]
    fn subtract_borrows_when_smaller(a: u8, b: u8, carry: bool) {
        let (value, borrow) = AluOp::SubtractWithBorrow.evaluate(a, b, carry);
        prop_assert_eq!(value, a.wrapping_sub(b).wrapping_sub(u8::from(carry)));
        prop_assert_eq!(borrow, Some(u16::from(a) < u16::from(b) + u16::from(carry)));
    }

    #[test]
    fn increment_never_touches_carry(register in register().prop_filter("A has no INr", |r| *r != Register::A), value: u8, carry: bool) {
        let opcode = (Register::ALL.iter().position(|r| *r == register).unwrap() as u8) << 3;
        let mut ram = Ram::new_with_program(&[opcode]);
        let mut core = Core::new(&mut ram);
        core.set_register(register, value);
        core.flags.carry = carry;

        core.step();
        prop_assert_eq!(core.register(register), value.wrapping_add(1));
        prop_assert_eq!(core.flags.carry, carry);
    }

    #[test]
    fn stack_never_exceeds_capacity(addresses in prop::collection::vec(any::<u16>(), 0..20)) {
        let mut stack = Stack::new();
        for address in &addresses {
            let before = stack.clone();
            match stack.push(*address) {
                Ok(()) => prop_assert_eq!(stack.entries().last(), Some(&(address & 0x3FFF))),
                Err(fault) => {
                    prop_assert_eq!(fault, Fault::StackOverflow { address: *address });
                    prop_assert_eq!(&stack, &before);
                }
            }
            prop_assert!(stack.pointer() <= STACK_CAPACITY);
        }
    }

    #[test]
    fn every_opcode_keeps_state_in_bounds(opcode: u8, operands: [u8; 2], pc in 0..MEMORY_SIZE as u16) {
        let mut ram = Ram::new();
        ram.write_byte(pc, opcode);
        ram.write_byte((pc + 1) & 0x3FFF, operands[0]);
        ram.write_byte((pc + 2) & 0x3FFF, operands[1]);

        let mut core = Core::new(&mut ram);
        core.program_counter = pc;
        core.step();

        prop_assert!(core.program_counter <= 0x3FFF);
        prop_assert!(core.stack.pointer() <= STACK_CAPACITY);
        prop_assert!(core.stack.entries().iter().all(|a| *a <= 0x3FFF));
    }
}

#[test]
fn ninth_push_is_rejected() {
    let mut stack = Stack::new();
    for address in 0..STACK_CAPACITY as u16 {
        stack.push(address * 8).unwrap();
    }

    let before = stack.clone();
    assert_eq!(stack.push(0x100), Err(Fault::StackOverflow { address: 0x100 }));
    assert_eq!(stack, before);
}

#[test]
fn increment_ff_wraps_to_zero() {
    // LBI ff, INB
    let mut ram = Ram::new_with_program(&[0x0E, 0xFF, 0x08]);
    let mut core = Core::new(&mut ram);
    core.step();
    core.step();

    assert_eq!(core.register(Register::B), 0x00);
    assert!(core.flags.zero);
    assert!(!core.flags.sign);
    assert!(core.flags.parity);
}
