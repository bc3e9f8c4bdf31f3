//! forthchan: a translator from a small Forth dialect to stack-machine code,
//! and a tick-accurate simulator for that machine.
//!
//! ```text
//! source ─► frontend (lexer, parser) ─► lang::Program
//!        ─► bytecode (linearizer)    ─► MachineCode
//!        ─► runtime (machine, driver) ─► SimulationReport
//! ```

pub mod bytecode;
pub mod frontend;
pub mod lang;
pub mod runtime;
pub mod translator;

pub use bytecode::{ImageError, MachineCode};
pub use runtime::{MachineConfig, MachineError, SimulationReport, Termination, simulate};
pub use translator::{TranslateError, translate};

/// Translate and simulate in one call.
pub fn run_source(
    source: &str,
    input: &str,
    config: &MachineConfig,
) -> Result<SimulationReport, TranslateError> {
    let code = translate(source)?;
    Ok(simulate(&code, input, config))
}
