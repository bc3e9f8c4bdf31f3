use std::collections::HashMap;

use crate::{
    bytecode::{
        compile_error::CompileError,
        ir::{MachineCode, WordSymbol},
        op::{Instruction, Opcode},
    },
    frontend::{
        lexer::{Span, Spanned},
        token::SignOp,
    },
    lang::{Builtin, LoopDirection, Program, Term, WordTable},
};

/// Operand of a jump or call whose target is not known yet.
pub const PLACEHOLDER_ADDR: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopKind {
    /// `do ... loop`: owns a frame on the loop-control stack.
    Counted,
    /// `begin ... until`
    Conditional,
}

struct LoopFrame {
    kind: LoopKind,
    /// Addresses of `JMP` instructions emitted by `leave`, patched to the exit.
    leave_sites: Vec<usize>,
}

/// A `CALL` waiting for its word's start address.
struct Relocation {
    site: usize,
    name: String,
    span: Span,
}

/// Lays a parsed program out in machine memory.
///
/// Main code starts at address 0 and ends with `HALT`; every word body follows
/// in definition order and ends with `RET`. Calls are emitted against
/// placeholders and patched once all word addresses are known.
pub struct Linearizer<'w> {
    words: &'w WordTable,
    code: Vec<Instruction>,
    relocations: Vec<Relocation>,
    loops: Vec<LoopFrame>,
}

/// Resolve words and produce the machine code for a parsed program.
pub fn compile_program(program: &Program) -> Result<MachineCode, CompileError> {
    let words = WordTable::from_definitions(program.definitions.iter().cloned())?;
    Linearizer::new(&words).linearize(&program.main)
}

impl<'w> Linearizer<'w> {
    pub fn new(words: &'w WordTable) -> Self {
        Self {
            words,
            code: Vec::new(),
            relocations: Vec::new(),
            loops: Vec::new(),
        }
    }

    pub fn linearize(mut self, main: &[Spanned<Term>]) -> Result<MachineCode, CompileError> {
        self.emit_body(main)?;
        self.emit(Opcode::Halt, None, None);

        let words = self.words;
        let mut symbols = Vec::with_capacity(words.len());
        for def in words.iter() {
            symbols.push(WordSymbol {
                name: def.name.clone(),
                address: self.here(),
            });
            self.emit_body(&def.body)?;
            self.emit(Opcode::Ret, None, Some(def.span));
        }

        self.resolve_calls(&symbols)?;

        Ok(MachineCode {
            instructions: self.code,
            words: symbols,
            entry: 0,
        })
    }

    // =========================================================================
    // Emission helpers
    // =========================================================================

    fn here(&self) -> usize {
        self.code.len()
    }

    fn emit(&mut self, opcode: Opcode, operand: Option<i64>, origin: Option<Span>) -> usize {
        let address = self.here();
        let instr = Instruction::new(address, opcode, operand);
        self.code.push(match origin {
            Some(span) => instr.with_origin(span),
            None => instr,
        });
        address
    }

    fn patch(&mut self, site: usize, target: usize) {
        self.code[site].operand = Some(target as i64);
    }

    fn resolve_calls(&mut self, symbols: &[WordSymbol]) -> Result<(), CompileError> {
        let addresses: HashMap<&str, usize> = symbols
            .iter()
            .map(|s| (s.name.as_str(), s.address))
            .collect();

        for reloc in std::mem::take(&mut self.relocations) {
            let target = addresses.get(reloc.name.as_str()).copied().ok_or(
                CompileError::UnknownWord {
                    name: reloc.name.clone(),
                    span: reloc.span,
                },
            )?;
            self.patch(reloc.site, target);
        }
        Ok(())
    }

    // =========================================================================
    // Terms
    // =========================================================================

    fn emit_body(&mut self, body: &[Spanned<Term>]) -> Result<(), CompileError> {
        for term in body {
            self.emit_term(term)?;
        }
        Ok(())
    }

    fn emit_term(&mut self, term: &Spanned<Term>) -> Result<(), CompileError> {
        let at = Some(term.span);

        match &term.node {
            Term::Number(n) => {
                self.emit(Opcode::Push, Some(*n), at);
            }

            Term::SignOp(op) => {
                let opcode = match op {
                    SignOp::Plus => Opcode::Add,
                    SignOp::Minus => Opcode::Sub,
                    SignOp::Star => Opcode::Mul,
                    SignOp::Slash => Opcode::Div,
                };
                self.emit(opcode, None, at);
            }

            Term::Builtin(builtin) => self.emit_builtin(*builtin, at),

            Term::WordRef(name) => {
                self.words.resolve(name, term.span)?;
                let site = self.emit(Opcode::Call, Some(PLACEHOLDER_ADDR), at);
                self.relocations.push(Relocation {
                    site,
                    name: name.clone(),
                    span: term.span,
                });
            }

            Term::ForLoop {
                has_index,
                direction,
                body,
            } => {
                let (init_op, step_op) = match direction {
                    LoopDirection::Up => (Opcode::LoopInit, Opcode::LoopStep),
                    LoopDirection::Down => (Opcode::LoopInitDown, Opcode::LoopStepDown),
                };
                let init = self.emit(init_op, Some(PLACEHOLDER_ADDR), at);
                let body_start = self.here();
                if *has_index {
                    self.emit(Opcode::LoopPushIndex, None, at);
                }
                self.loops.push(LoopFrame {
                    kind: LoopKind::Counted,
                    leave_sites: Vec::new(),
                });
                self.emit_body(body)?;
                self.emit(step_op, Some(body_start as i64), at);
                let exit = self.here();
                self.patch(init, exit);
                self.close_loop(exit);
            }

            Term::DoWhileLoop { body } => {
                let body_start = self.here();
                self.loops.push(LoopFrame {
                    kind: LoopKind::Conditional,
                    leave_sites: Vec::new(),
                });
                self.emit_body(body)?;
                self.emit(Opcode::Jz, Some(body_start as i64), at);
                let exit = self.here();
                self.close_loop(exit);
            }

            // JZ then_start; <else>; JMP end; then_start: <then>; end:
            Term::IfThen {
                then_body,
                else_body,
            } => {
                let jz = self.emit(Opcode::Jz, Some(PLACEHOLDER_ADDR), at);
                if let Some(else_body) = else_body {
                    self.emit_body(else_body)?;
                }
                let jmp = self.emit(Opcode::Jmp, Some(PLACEHOLDER_ADDR), at);
                let then_start = self.here();
                self.patch(jz, then_start);
                self.emit_body(then_body)?;
                let end = self.here();
                self.patch(jmp, end);
            }

            Term::PrintLiteral(bytes) => {
                for &b in bytes {
                    self.emit(Opcode::TrapOut, Some(i64::from(b)), at);
                }
            }

            Term::Leave => {
                let kind = self
                    .loops
                    .last()
                    .map(|frame| frame.kind)
                    .ok_or(CompileError::MismatchedLeave { span: term.span })?;
                if kind == LoopKind::Counted {
                    self.emit(Opcode::LoopDrop, None, at);
                }
                let site = self.emit(Opcode::Jmp, Some(PLACEHOLDER_ADDR), at);
                if let Some(frame) = self.loops.last_mut() {
                    frame.leave_sites.push(site);
                }
            }
        }

        Ok(())
    }

    fn emit_builtin(&mut self, builtin: Builtin, at: Option<Span>) {
        let opcode = match builtin {
            Builtin::Dup => Opcode::Dup,
            Builtin::Drop => Opcode::Drop,
            Builtin::Swap => Opcode::Swap,
            Builtin::Over => Opcode::Over,
            Builtin::Pick => Opcode::Pick,
            // ( a b -- a b a ) then ( a b a -- a b a b )
            Builtin::Dudup => {
                self.emit(Opcode::Over, None, at);
                Opcode::Over
            }
            Builtin::Mod => Opcode::Mod,
            Builtin::Eq => Opcode::Eq,
            Builtin::Ne => Opcode::Ne,
            Builtin::Lt => Opcode::Lt,
            Builtin::Gt => Opcode::Gt,
            Builtin::Le => Opcode::Le,
            Builtin::Ge => Opcode::Ge,
            Builtin::Emit => Opcode::TrapOut,
            Builtin::Key => Opcode::TrapIn,
            Builtin::Cr => {
                self.emit(Opcode::Push, Some(13), at);
                Opcode::TrapOut
            }
        };
        self.emit(opcode, None, at);
    }

    fn close_loop(&mut self, exit: usize) {
        if let Some(frame) = self.loops.pop() {
            for site in frame.leave_sites {
                self.patch(site, exit);
            }
        }
    }
}
