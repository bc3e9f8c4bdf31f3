use std::collections::BTreeSet;

use crate::bytecode::ir::MachineCode;
use crate::bytecode::op::{Instruction, OperandKind};

/// Print disassembly of a machine-code image
pub fn print_code(code: &MachineCode) {
    print!("{}", disassemble(code));
}

/// Return disassembly as a String
pub fn disassemble(code: &MachineCode) -> String {
    let mut output = String::new();
    let jump_targets = collect_jump_targets(code);

    output.push_str("════════════════════════════════════════\n");
    output.push_str(" main\n");
    output.push_str(&format!(
        " {} instructions, {} words\n",
        code.len(),
        code.words.len()
    ));
    output.push_str("════════════════════════════════════════\n");

    for instr in &code.instructions {
        if let Some(name) = code.word_at(instr.address) {
            output.push('\n');
            output.push_str(&format!(": {}\n", name));
        }

        if jump_targets.contains(&instr.address) {
            output.push_str("      ┌──────────────────────────────────\n");
        }

        output.push_str(&format!("{:04} ", instr.address));

        if jump_targets.contains(&instr.address) {
            output.push_str("► ");
        } else {
            output.push_str("  ");
        }

        output.push_str(&format_instruction(instr, code));
        output.push('\n');
    }

    output
}

fn collect_jump_targets(code: &MachineCode) -> BTreeSet<usize> {
    code.instructions
        .iter()
        .filter_map(Instruction::target)
        .collect()
}

fn format_instruction(instr: &Instruction, code: &MachineCode) -> String {
    let mut text = match (instr.opcode.operand_kind(), instr.operand) {
        (OperandKind::Address, Some(operand)) => {
            let direction = if operand as usize <= instr.address {
                "↑"
            } else {
                "↓"
            };
            match code.word_at(operand as usize) {
                Some(name) => format!("{:<16}{:04} {} ({})", instr.opcode, operand, direction, name),
                None => format!("{:<16}{:04} {}", instr.opcode, operand, direction),
            }
        }
        (OperandKind::OptionalByte, Some(b)) => match u8::try_from(b) {
            Ok(byte) if byte.is_ascii_graphic() || byte == b' ' => {
                format!("{:<16}{:<6} ; '{}'", instr.opcode, b, byte as char)
            }
            _ => format!("{:<16}{}", instr.opcode, b),
        },
        (_, Some(operand)) => format!("{:<16}{}", instr.opcode, operand),
        (_, None) => instr.opcode.to_string(),
    };

    if let Some(origin) = instr.origin {
        text = format!("{:<40}@ {}", text, origin);
    }
    text
}
