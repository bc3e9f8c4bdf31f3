/// Faults raised while executing machine code.
///
/// The first group is reachable from well-formed programs. The second group
/// means the machine code itself is broken and never occurs for translator
/// output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MachineError {
    #[error("runtime error: stack underflow: needed {needed} items, found {available}")]
    StackUnderflow { needed: usize, available: usize },

    #[error("runtime error: stack overflow: data stack holds at most {capacity} items")]
    StackOverflow { capacity: usize },

    #[error("runtime error: loop stack overflow: more than {capacity} nested do loops")]
    LoopStackOverflow { capacity: usize },

    #[error(
        "runtime error: return stack overflow: call depth exceeded {capacity}\n  hint: check recursive words for a missing base case"
    )]
    ReturnStackOverflow { capacity: usize },

    #[error("runtime error: division by zero")]
    DivisionByZero,

    #[error("runtime error: input exhausted")]
    InputExhausted,

    #[error("runtime error: {0} is not a byte and cannot be written to the output port")]
    InvalidOutputByte(i64),

    #[error("runtime error: pick index {0} is negative")]
    NegativePickIndex(i64),

    // ─────────────────────── Internal invariant violations ──────────────────────
    #[error("internal error: loop stack underflow")]
    LoopStackUnderflow,

    #[error("internal error: return stack underflow")]
    ReturnStackUnderflow,

    #[error("internal error: program counter {0} is outside memory")]
    InvalidAddress(i64),

    #[error("internal error: instruction at {address} is missing its operand")]
    MissingOperand { address: usize },
}

impl MachineError {
    /// True for faults that indicate malformed machine code.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            MachineError::LoopStackUnderflow
                | MachineError::ReturnStackUnderflow
                | MachineError::InvalidAddress(_)
                | MachineError::MissingOperand { .. }
        )
    }
}
