pub mod compile;
pub mod compile_error;
pub mod disasm;
pub mod ir;
pub mod op;
pub mod verify;

pub use compile::{Linearizer, compile_program};
pub use compile_error::CompileError;
pub use ir::{ImageError, MachineCode, WordSymbol};
pub use op::{Instruction, Opcode};
pub use verify::{VerifyError, verify};
