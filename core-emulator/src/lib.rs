mod common;
pub use common::*;

mod stack;
pub use stack::*;

mod cpu;
pub use cpu::*;
