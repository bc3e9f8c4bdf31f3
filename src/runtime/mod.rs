pub mod driver;
pub mod io;
pub mod machine;
pub mod runtime_error;
pub mod stack;

pub use driver::{Limit, SimulationReport, Termination, TraceRecord, simulate};
pub use machine::{Machine, MachineConfig};
pub use runtime_error::MachineError;
