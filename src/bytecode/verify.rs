use crate::bytecode::ir::MachineCode;
use crate::bytecode::op::{Instruction, Opcode, OperandKind};

/// Structural problems in a machine-code image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("verify error: machine code is empty")]
    Empty,

    #[error("verify error: entry point is {0}, expected 0")]
    BadEntry(usize),

    #[error("verify error: instruction {index} records address {recorded}")]
    AddressMismatch { index: usize, recorded: usize },

    #[error("verify error: {instruction} at {address} requires an operand")]
    MissingOperand { address: usize, instruction: String },

    #[error("verify error: {instruction} at {address} takes no operand")]
    UnexpectedOperand { address: usize, instruction: String },

    #[error("verify error: {instruction} at {address} targets {target}, outside 0..{len}")]
    TargetOutOfRange {
        address: usize,
        instruction: String,
        target: i64,
        len: usize,
    },

    #[error("verify error: {instruction} at {address} writes {value}, not a byte")]
    BadOutputByte {
        address: usize,
        instruction: String,
        value: i64,
    },

    #[error("verify error: word '{name}' starts at {address}, outside memory")]
    BadWordAddress { name: String, address: usize },

    #[error("verify error: memory ends with {instruction}, which falls through")]
    FallsOffEnd { instruction: String },
}

/// Check that an image can be executed without tripping over its own layout.
///
/// NOTE: this is a structural check only. It does not follow control flow, so
/// stack depth and loop-frame balance are left to the machine.
pub fn verify(code: &MachineCode) -> Result<(), VerifyError> {
    let len = code.instructions.len();
    let last = code.instructions.last().ok_or(VerifyError::Empty)?;

    if code.entry != 0 {
        return Err(VerifyError::BadEntry(code.entry));
    }

    for (index, instr) in code.instructions.iter().enumerate() {
        if instr.address != index {
            return Err(VerifyError::AddressMismatch {
                index,
                recorded: instr.address,
            });
        }
        check_operand(instr, len)?;
    }

    for word in &code.words {
        if word.address >= len {
            return Err(VerifyError::BadWordAddress {
                name: word.name.clone(),
                address: word.address,
            });
        }
    }

    if !matches!(last.opcode, Opcode::Halt | Opcode::Ret | Opcode::Jmp) {
        return Err(VerifyError::FallsOffEnd {
            instruction: last.to_string(),
        });
    }

    Ok(())
}

fn check_operand(instr: &Instruction, len: usize) -> Result<(), VerifyError> {
    let address = instr.address;
    match (instr.opcode.operand_kind(), instr.operand) {
        (OperandKind::None, Some(_)) => Err(VerifyError::UnexpectedOperand {
            address,
            instruction: instr.to_string(),
        }),
        (OperandKind::Immediate | OperandKind::Address, None) => Err(VerifyError::MissingOperand {
            address,
            instruction: instr.to_string(),
        }),
        (OperandKind::Address, Some(target)) if target < 0 || target as usize >= len => {
            Err(VerifyError::TargetOutOfRange {
                address,
                instruction: instr.to_string(),
                target,
                len,
            })
        }
        (OperandKind::OptionalByte, Some(value)) if !(0..=255).contains(&value) => {
            Err(VerifyError::BadOutputByte {
                address,
                instruction: instr.to_string(),
                value,
            })
        }
        _ => Ok(()),
    }
}
