mod asm;
pub use asm::*;

mod image;
pub use image::*;
