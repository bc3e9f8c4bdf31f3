use serde::{Deserialize, Serialize};

use crate::frontend::lexer::Span;

// =============================================================================
// OPCODE - Machine instruction set
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // literals
    Push,

    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // stack ops
    Dup,
    Drop,
    Swap,
    Over,
    /// Pop `u`, push a copy of the `u`-th remaining item (0 is the top).
    Pick,

    // comparison (0 = true, -1 = false)
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    // ==========================================================================
    // Control flow - absolute addresses
    // ==========================================================================
    /// Push the return address on the return stack and jump.
    Call,
    /// Pop the return address and jump to it.
    Ret,
    /// Unconditional jump.
    Jmp,
    /// Pop the top of stack, jump if it is zero.
    Jz,

    // ==========================================================================
    // Loop control stack
    // ==========================================================================
    /// Pop limit and start. Jump to the operand if `start >= limit`, otherwise
    /// push a loop frame.
    LoopInit,
    /// Increment the current index; jump to the operand while below the
    /// limit, otherwise pop the frame and fall through.
    LoopStep,
    /// Like `LoopInit` for a count-down loop: jumps to the operand if
    /// `start <= limit`.
    LoopInitDown,
    /// Decrement the current index; jump to the operand while above the
    /// limit, otherwise pop the frame and fall through.
    LoopStepDown,
    /// Push the current index of the innermost frame on the data stack.
    LoopPushIndex,
    /// Discard the innermost frame.
    LoopDrop,

    // ==========================================================================
    // Traps
    // ==========================================================================
    /// Read one character from the input port and push it.
    TrapIn,
    /// Write one byte to the output port: the operand if present, otherwise
    /// the popped top of stack.
    TrapOut,

    Halt,
}

/// What the operand of an opcode means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    None,
    Immediate,
    Address,
    OptionalByte,
}

impl Opcode {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Dup => "DUP",
            Opcode::Drop => "DROP",
            Opcode::Swap => "SWAP",
            Opcode::Over => "OVER",
            Opcode::Pick => "PICK",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Le => "LE",
            Opcode::Ge => "GE",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Jmp => "JMP",
            Opcode::Jz => "JZ",
            Opcode::LoopInit => "LOOP-INIT",
            Opcode::LoopStep => "LOOP-STEP",
            Opcode::LoopInitDown => "LOOP-INIT-DOWN",
            Opcode::LoopStepDown => "LOOP-STEP-DOWN",
            Opcode::LoopPushIndex => "LOOP-PUSH-INDEX",
            Opcode::LoopDrop => "LOOP-DROP",
            Opcode::TrapIn => "TRAP-IN",
            Opcode::TrapOut => "TRAP-OUT",
            Opcode::Halt => "HALT",
        }
    }

    pub fn operand_kind(&self) -> OperandKind {
        match self {
            Opcode::Push => OperandKind::Immediate,
            Opcode::Call
            | Opcode::Jmp
            | Opcode::Jz
            | Opcode::LoopInit
            | Opcode::LoopStep
            | Opcode::LoopInitDown
            | Opcode::LoopStepDown => OperandKind::Address,
            Opcode::TrapOut => OperandKind::OptionalByte,
            _ => OperandKind::None,
        }
    }

    /// Machine ticks spent executing one instruction with this opcode.
    ///
    /// Multi-cycle instructions model the extra data-path stages they need:
    /// SWAP moves through a temporary cell, OVER and PICK address a cell
    /// below the top, the return/loop stack ops touch a second stack, DIV and
    /// MOD use a two-stage divider.
    pub fn ticks(&self) -> u64 {
        match self {
            Opcode::Swap => 3,
            Opcode::Over
            | Opcode::Pick
            | Opcode::Call
            | Opcode::Ret
            | Opcode::LoopInit
            | Opcode::LoopStep
            | Opcode::LoopInitDown
            | Opcode::LoopStepDown
            | Opcode::Div
            | Opcode::Mod => 2,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// One word of machine memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub address: usize,
    pub opcode: Opcode,
    pub operand: Option<i64>,
    /// Source position of the term this instruction was generated from.
    pub origin: Option<Span>,
}

impl Instruction {
    pub fn new(address: usize, opcode: Opcode, operand: Option<i64>) -> Self {
        Self {
            address,
            opcode,
            operand,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Span) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Control-transfer target, for opcodes whose operand is an address.
    pub fn target(&self) -> Option<usize> {
        match self.opcode.operand_kind() {
            OperandKind::Address => self.operand.and_then(|a| usize::try_from(a).ok()),
            _ => None,
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operand {
            Some(operand) => write!(f, "{} {}", self.opcode, operand),
            None => write!(f, "{}", self.opcode),
        }
    }
}
