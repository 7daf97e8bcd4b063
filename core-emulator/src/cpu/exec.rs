use log::{debug, info, trace, warn};

use crate::common::{mask_address, Fault, Memory};

use super::{decode, AluOp, Core, Instruction, Register};

impl<'m, M: Memory<AddressSpace = u16>> Core<'m, M> {
    /// Fetches and executes one instruction.
    pub fn step(&mut self) {
        self.halted = false;
        let opcode = self.read_at_pc();
        self.execute(opcode);
    }

    /// Steps until the engine halts, or `limit` instructions have run.
    /// Returns how many instructions were executed.
    pub fn execute_until_halt(&mut self, limit: usize) -> usize {
        for executed in 1..=limit {
            self.step();
            if self.halted {
                return executed;
            }
        }
        limit
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Executes an opcode which has already been fetched from the program counter.
    pub fn execute(&mut self, opcode: u8) {
        let address = mask_address(self.program_counter);
        self.program_counter = mask_address(self.program_counter.wrapping_add(1));
        self.last_fault = None;

        let instruction = decode(opcode);
        trace!("{address:#06x}: {opcode:#04x} {instruction:?}");

        match instruction {
            Instruction::Halt => {
                info!("HALT at {address:#06x}");
                self.halt();
            }

            Instruction::Increment(register) => {
                let value = self.registers[register].wrapping_add(1);
                self.registers[register] = value;
                self.flags.update_from_result(value);
            }

            Instruction::Decrement(register) => {
                let value = self.registers[register].wrapping_sub(1);
                self.registers[register] = value;
                self.flags.update_from_result(value);
            }

            Instruction::AluImmediate(op) => {
                let operand = self.fetch_byte();
                // CPI doesn't touch carry
                if let Some(carry) = self.accumulate(op, operand) {
                    self.flags.carry = carry;
                }
            }

            Instruction::Alu(op, source) => {
                let operand = self.read_operand(source);
                // CPr clears carry, like the logic operations
                self.flags.carry = self.accumulate(op, operand).unwrap_or(false);
            }

            Instruction::LoadImmediate(dest) => {
                let value = self.fetch_byte();
                self.write_operand(dest, value);
            }

            Instruction::Rotate(op) => {
                let (value, carry) = op.apply(self.registers[Register::A], self.flags.carry);
                self.registers[Register::A] = value;
                self.flags.carry = carry;
                self.flags.update_from_result(value);
            }

            Instruction::Return => {
                self.program_counter = self.pop();
            }

            Instruction::ReturnIf(condition) => {
                if condition.holds(&self.flags) {
                    self.program_counter = self.pop();
                }
            }

            Instruction::Restart(vector) => {
                self.push(self.program_counter);
                self.program_counter = vector;
            }

            Instruction::Jump => {
                self.program_counter = self.fetch_address();
            }

            Instruction::JumpIf(condition) => {
                let target = self.fetch_address();
                if condition.holds(&self.flags) {
                    self.program_counter = target;
                }
            }

            Instruction::Call => {
                let target = self.fetch_address();
                self.push(self.program_counter);
                self.program_counter = target;
            }

            Instruction::CallIf(condition) => {
                let target = self.fetch_address();
                if condition.holds(&self.flags) {
                    self.push(self.program_counter);
                    self.program_counter = target;
                }
            }

            Instruction::InputOutput { port } => {
                debug!("ignoring I/O on port {port} at {address:#06x}");
            }

            Instruction::LoadFromMemory(dest) => {
                self.registers[dest] = self.memory.read_byte(mask_address(self.registers.m()));
            }

            Instruction::StoreToMemory(src) => {
                let value = self.registers[src];
                self.memory.write_byte(mask_address(self.registers.m()), value);
            }

            Instruction::Move { dest, src } => {
                if dest != src {
                    self.registers[dest] = self.registers[src];
                }
            }

            Instruction::Unknown => {
                self.report(Fault::UnknownOpcode { opcode, address });
            }
        }
    }

    /// Runs `op` against the accumulator, updating sign, zero and parity.
    /// Returns the carry the operation produced, which the caller applies.
    fn accumulate(&mut self, op: AluOp, operand: u8) -> Option<bool> {
        let (value, carry) = op.evaluate(self.registers[Register::A], operand, self.flags.carry);
        self.flags.update_from_result(value);
        if op.stores_result() {
            self.registers[Register::A] = value;
        }
        carry
    }

    fn push(&mut self, address: u16) {
        if let Err(fault) = self.stack.push(address) {
            self.report(fault);
        }
    }

    /// Pops a return address. An empty stack yields the current program counter.
    fn pop(&mut self) -> u16 {
        match self.stack.pop() {
            Ok(address) => address,
            Err(fault) => {
                self.report(fault);
                self.program_counter
            }
        }
    }

    fn report(&mut self, fault: Fault) {
        warn!("{fault}");
        self.last_fault = Some(fault);
    }
}
