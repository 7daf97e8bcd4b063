//! The 8008 keeps return addresses in a small on-chip array rather than in memory.

use crate::common::{mask_address, Fault, RequestError};

pub const STACK_CAPACITY: usize = 8;

/// Bounded address stack. The pointer never exceeds [`STACK_CAPACITY`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stack {
    pointer: usize,
    slots: [u16; STACK_CAPACITY],
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_data(addresses: &[u16]) -> Self {
        let mut stack = Self::new();

        for address in addresses {
            let _ = stack.push(*address);
        }

        stack
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn set_pointer(&mut self, pointer: usize) -> Result<(), RequestError> {
        if pointer > STACK_CAPACITY {
            return Err(RequestError::StackPointerOutOfRange(pointer));
        }
        self.pointer = pointer;
        Ok(())
    }

    /// Addresses currently on the stack, bottom first.
    pub fn entries(&self) -> &[u16] {
        &self.slots[..self.pointer]
    }

    pub fn is_empty(&self) -> bool {
        self.pointer == 0
    }

    pub fn is_full(&self) -> bool {
        self.pointer == STACK_CAPACITY
    }

    /// Pushes a 14-bit address. A full stack is left untouched.
    pub fn push(&mut self, address: u16) -> Result<(), Fault> {
        if self.is_full() {
            return Err(Fault::StackOverflow { address });
        }
        self.slots[self.pointer] = mask_address(address);
        self.pointer += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<u16, Fault> {
        if self.is_empty() {
            return Err(Fault::StackUnderflow);
        }
        self.pointer -= 1;
        Ok(self.slots[self.pointer])
    }
}

#[cfg(test)]
mod test {
    use crate::common::{Fault, RequestError};
    use super::{Stack, STACK_CAPACITY};

    #[test]
    fn test_stack_push_pop() {
        let mut stack = Stack::new_with_data(&[0x0010, 0x0020]);

        assert_eq!(stack.entries(), &[0x0010, 0x0020]);
        assert_eq!(stack.pop(), Ok(0x0020));
        assert_eq!(stack.pop(), Ok(0x0010));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_stack_masks_addresses() {
        let mut stack = Stack::new();
        stack.push(0xFFFF).unwrap();
        assert_eq!(stack.pop(), Ok(0x3FFF));
    }

    #[test]
    fn test_stack_overflow_leaves_stack_alone() {
        let addresses: Vec<u16> = (1..=STACK_CAPACITY as u16).collect();
        let mut stack = Stack::new_with_data(&addresses);
        assert!(stack.is_full());

        let before = stack.clone();
        assert_eq!(stack.push(0x1234), Err(Fault::StackOverflow { address: 0x1234 }));
        assert_eq!(stack, before);
    }

    #[test]
    fn test_stack_underflow() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(Fault::StackUnderflow));
        assert_eq!(stack.pointer(), 0);
    }

    #[test]
    fn test_set_pointer() {
        let mut stack = Stack::new();
        assert_eq!(stack.set_pointer(STACK_CAPACITY), Ok(()));
        assert_eq!(stack.set_pointer(9), Err(RequestError::StackPointerOutOfRange(9)));
        assert_eq!(stack.pointer(), STACK_CAPACITY);
    }
}
