use std::borrow::Cow;

use log::{debug, info, trace, warn};

use crate::bytecode::ir::MachineCode;
use crate::bytecode::op::{Instruction, Opcode};
use crate::runtime::machine::{Machine, MachineConfig};
use crate::runtime::runtime_error::MachineError;

/// Which configured ceiling stopped a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Instructions(u64),
    Ticks(u64),
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Instructions(n) => write!(f, "{} instructions", n),
            Limit::Ticks(n) => write!(f, "{} ticks", n),
        }
    }
}

/// How a simulation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Halted,
    /// A runtime fault. `tick` and `pc` are the values at the start of the
    /// faulting instruction.
    Fault {
        error: MachineError,
        tick: u64,
        pc: usize,
        instruction: Option<Instruction>,
    },
    /// The run was cut off by a configured ceiling. Not a fault.
    LimitExceeded(Limit),
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Halted => write!(f, "halted"),
            Termination::Fault {
                error,
                tick,
                pc,
                instruction,
            } => {
                write!(f, "{}", error)?;
                match instruction {
                    Some(instr) => write!(f, "\n  at {:04}: {} (tick {})", pc, instr, tick)?,
                    None => write!(f, "\n  at {:04} (tick {})", pc, tick)?,
                }
                if let Some(origin) = instruction.as_ref().and_then(|i| i.origin) {
                    write!(f, "\n  source: {}", origin)?;
                }
                Ok(())
            }
            Termination::LimitExceeded(limit) => write!(f, "limit exceeded: {}", limit),
        }
    }
}

/// One executed instruction, as seen after it completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRecord {
    pub tick: u64,
    pub pc: usize,
    pub opcode: Opcode,
    pub operand: Option<i64>,
    pub stack: Vec<i64>,
}

impl std::fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let instr = match self.operand {
            Some(operand) => format!("{} {}", self.opcode, operand),
            None => self.opcode.to_string(),
        };
        write!(
            f,
            "tick {:>6}  pc {:04}  {:<20} {:?}",
            self.tick, self.pc, instr, self.stack
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub output: Vec<u8>,
    pub termination: Termination,
    pub instructions: u64,
    pub ticks: u64,
    /// Data stack at the end of the run, bottom first.
    pub stack: Vec<i64>,
    /// Input characters never read by the program.
    pub unread_input: usize,
    /// Empty unless tracing was enabled.
    pub trace: Vec<TraceRecord>,
}

impl SimulationReport {
    /// Output as text; bytes outside UTF-8 are replaced.
    pub fn output_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.output)
    }

    pub fn is_halted(&self) -> bool {
        self.termination == Termination::Halted
    }

    pub fn fault(&self) -> Option<&MachineError> {
        match &self.termination {
            Termination::Fault { error, .. } => Some(error),
            _ => None,
        }
    }
}

fn limit_reached(machine: &Machine<'_>, config: &MachineConfig) -> Option<Limit> {
    if let Some(max) = config.max_instructions {
        if machine.instructions_executed() >= max {
            return Some(Limit::Instructions(max));
        }
    }
    if let Some(max) = config.max_ticks {
        if machine.ticks() >= max {
            return Some(Limit::Ticks(max));
        }
    }
    None
}

/// Run `code` from its entry point until it halts, faults, or hits a ceiling.
///
/// Never fails: faults are part of the report, together with whatever output
/// was produced before them.
pub fn simulate(code: &MachineCode, input: &str, config: &MachineConfig) -> SimulationReport {
    let mut machine = Machine::new(code, config, input);
    let mut records = Vec::new();

    debug!(
        "simulation start: {} instructions in memory, {} input chars",
        code.len(),
        input.chars().count()
    );

    let termination = loop {
        if machine.is_halted() {
            break Termination::Halted;
        }
        if let Some(limit) = limit_reached(&machine, config) {
            warn!("Limit exceeded! ({})", limit);
            break Termination::LimitExceeded(limit);
        }

        let pc = machine.pc();
        let tick = machine.ticks();
        let instruction = machine.current_instruction();

        if let Err(error) = machine.step() {
            if error == MachineError::InputExhausted {
                warn!("Input buffer is empty!");
            }
            break Termination::Fault {
                error,
                tick,
                pc,
                instruction: instruction.cloned(),
            };
        }

        if let Some(instr) = instruction {
            trace!(
                "tick {} pc {:04} {} stack {:?}",
                machine.ticks(),
                pc,
                instr,
                machine.stack()
            );
            if config.trace {
                records.push(TraceRecord {
                    tick: machine.ticks(),
                    pc,
                    opcode: instr.opcode,
                    operand: instr.operand,
                    stack: machine.stack().to_vec(),
                });
            }
        }
    };

    let instructions = machine.instructions_executed();
    let ticks = machine.ticks();
    let stack = machine.stack().to_vec();
    let unread_input = machine.remaining_input();
    let output = machine.into_output();

    debug!(
        "simulation end: {} after {} instructions, {} ticks, {} input chars unread",
        termination, instructions, ticks, unread_input
    );
    info!("output_buffer: {:?}", String::from_utf8_lossy(&output));

    SimulationReport {
        output,
        termination,
        instructions,
        ticks,
        stack,
        unread_input,
        trace: records,
    }
}
