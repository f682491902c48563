mod instruction;
mod program;

pub use instruction::{Address, Comp, Dest, Instruction, Jump};
pub use program::{AsmProgram, write_instructions};
