pub mod asm;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod memory;

pub use asm::{assemble, AsmError, Assembled, Assembler};
pub use cpu::{Cpu, Flags, RunConfig, RunOutcome, Trap};
pub use instructions::OpcodeTable;
pub use memory::{Image, Memory, MEM_SIZE};
